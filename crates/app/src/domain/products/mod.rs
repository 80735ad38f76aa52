//! Products

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use service::*;

pub(crate) use repository::{encode_amount, try_get_amount, try_get_localized};
