//! Authentication and authorization

mod authorization;
mod errors;
mod models;
pub mod repository;
mod service;
mod token;

pub use authorization::*;
pub use errors::*;
pub use models::*;
pub use repository::{AuthRepository, PgAuthRepository};
pub use service::*;
pub use token::*;
