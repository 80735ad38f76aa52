//! Customer Handlers

pub(crate) mod admin_index;
pub(crate) mod create;
pub(crate) mod me;
pub(crate) mod update;
