//! Krua storefront services: catalogue, customers, orders, auth and the
//! persistence behind them.

pub mod audit;
pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;
pub mod uuids;

#[cfg(test)]
mod test;
