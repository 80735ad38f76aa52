//! Rate Limit Config

use std::time::Duration;

use clap::Args;

/// Throttling for the public write endpoints.
#[derive(Debug, Args)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window
    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value_t = 10_u32)]
    pub rate_limit_requests: u32,

    /// Window length in seconds, at least 1
    #[arg(
        long,
        env = "RATE_LIMIT_WINDOW_SECONDS",
        default_value_t = 60_u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rate_limit_window_seconds: u64,

    /// Maximum number of clients tracked at once
    #[arg(long, env = "RATE_LIMIT_CAPACITY", default_value_t = 10_000_usize)]
    pub rate_limit_capacity: usize,

    /// Key clients by the first `X-Forwarded-For` entry instead of the peer address
    #[arg(long, env = "TRUST_FORWARDED_FOR", default_value_t = false)]
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    /// The configured window.
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }
}
