//! Orders

mod confirmations;
pub mod errors;
pub mod models;
pub(crate) mod repositories;
pub mod service;
mod status;

pub use errors::OrdersServiceError;
pub use service::*;
