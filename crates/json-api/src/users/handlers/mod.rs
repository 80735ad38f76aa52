//! User Administration Handlers

pub(crate) mod delete;
pub(crate) mod link;
pub(crate) mod orphans;
pub(crate) mod preview;
pub(crate) mod roles;
