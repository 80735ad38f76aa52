//! Account administration: deleting users and resolving logins without a
//! customer profile.

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::UsersServiceError;
pub use service::*;
