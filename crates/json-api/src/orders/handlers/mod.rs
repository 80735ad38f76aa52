//! Order Handlers

pub(crate) mod admin_index;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod mine;
pub(crate) mod payment;
pub(crate) mod retry;
pub(crate) mod status;
