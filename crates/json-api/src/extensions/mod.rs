//! Extension traits

mod depot;
mod principal;
mod request;
mod result;

pub(crate) use depot::DepotExt as _;
pub(crate) use principal::PrincipalExt as _;
pub(crate) use request::RequestExt as _;
pub(crate) use result::ResultExt as _;
