//! Storefront domain

pub mod contact;
pub mod customers;
pub mod localized;
pub mod orders;
pub mod products;
pub mod users;
pub mod validation;
