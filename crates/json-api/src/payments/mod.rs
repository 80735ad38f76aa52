//! Payment Gateway

pub(crate) mod notify;
