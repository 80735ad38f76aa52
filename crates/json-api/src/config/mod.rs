//! Server configuration module

use clap::Parser;

use crate::config::{
    auth::AuthConfig,
    db::DatabaseConfig,
    notifications::NotificationsConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payment::PaymentConfig,
    rate_limit::RateLimitConfig,
    server::ServerRuntimeConfig,
    store::StoreConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod notifications;
pub(crate) mod observability;
pub(crate) mod payment;
pub(crate) mod rate_limit;
pub(crate) mod server;
pub(crate) mod store;

pub(crate) use observability::LogFormat;

/// Krua JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "krua-json", about = "Krua storefront JSON API", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Bearer token settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Order email settings.
    #[command(flatten)]
    pub notifications: NotificationsConfig,

    /// Pricing settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Public write endpoint throttling.
    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    /// Payment gateway webhook settings.
    #[command(flatten)]
    pub payment: PaymentConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
