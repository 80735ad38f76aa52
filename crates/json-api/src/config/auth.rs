//! Auth Config

use clap::Args;

/// Bearer token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Server-side pepper mixed into stored access token hashes
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    pub token_pepper: String,

    /// Require an MFA-verified token on moderator and admin routes
    #[arg(long, env = "REQUIRE_STAFF_MFA", default_value_t = false)]
    pub require_staff_mfa: bool,
}
