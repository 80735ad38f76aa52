//! Notifications Config

use std::time::Duration;

use clap::Args;
use krua_app::notifications::FunctionsConfig;

/// Serverless function settings for order emails.
#[derive(Debug, Args)]
pub struct NotificationsConfig {
    /// Base URL of the functions host; emails are disabled when unset
    #[arg(long, env = "FUNCTIONS_URL")]
    pub functions_url: Option<String>,

    /// Service key sent to the functions host
    #[arg(
        long,
        env = "FUNCTIONS_SERVICE_KEY",
        hide_env_values = true,
        default_value = ""
    )]
    pub functions_service_key: String,

    /// Per-call timeout in seconds
    #[arg(long, env = "FUNCTIONS_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub functions_timeout_seconds: u64,
}

impl NotificationsConfig {
    /// The notifier configuration, or `None` when emails are disabled.
    #[must_use]
    pub fn functions_config(&self) -> Option<FunctionsConfig> {
        let url = self.functions_url.as_deref()?.trim();

        if url.is_empty() {
            return None;
        }

        Some(FunctionsConfig {
            url: url.to_string(),
            service_key: self.functions_service_key.clone(),
            timeout: Duration::from_secs(self.functions_timeout_seconds),
        })
    }
}
