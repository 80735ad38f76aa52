//! Payment Config

use clap::Args;

/// Payment gateway settings.
#[derive(Debug, Args)]
pub struct PaymentConfig {
    /// Shared secret the gateway sends in `x-gateway-key`; the webhook
    /// rejects every call when unset
    #[arg(long, env = "PAYMENT_GATEWAY_KEY", hide_env_values = true)]
    pub payment_gateway_key: Option<String>,
}
