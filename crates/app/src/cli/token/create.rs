use clap::Args;
use jiff::Timestamp;
use krua_app::auth::{AuthUserUuid, PgAuthService, TokenPepper};
use uuid::Uuid;

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User that should own the token
    #[arg(long)]
    user_uuid: Uuid,

    /// Server-side pepper mixed into stored token hashes
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    token_pepper: String,

    /// Mark the token as issued after a second factor
    #[arg(long, default_value_t = false)]
    mfa_verified: bool,

    /// Optional token expiration timestamp (RFC 3339)
    #[arg(long)]
    token_expires_at: Option<String>,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let token_expires_at = parse_token_expires_at(args.token_expires_at.as_deref())?;

    if let Some(expires_at) = token_expires_at.as_ref()
        && *expires_at <= Timestamp::now()
    {
        return Err("token-expires-at must be in the future".to_string());
    }

    if args.token_pepper.trim().is_empty() {
        return Err("token pepper cannot be empty".to_string());
    }

    let pool = args.database.connect().await?;
    let service = PgAuthService::new(pool, TokenPepper::new(args.token_pepper));

    let issued = service
        .issue_access_token(
            AuthUserUuid::from_uuid(args.user_uuid),
            args.mfa_verified,
            token_expires_at,
        )
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("user_uuid: {}", issued.metadata.user_uuid);
    println!("token_version: {}", issued.metadata.version.as_i16());
    println!("mfa_verified: {}", issued.metadata.mfa_verified);
    println!("token_created_at: {}", issued.metadata.created_at);
    if let Some(expires_at) = issued.metadata.expires_at {
        println!("token_expires_at: {expires_at}");
    }
    println!("access_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}

fn parse_token_expires_at(raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    raw.map(|value| {
        value
            .parse::<Timestamp>()
            .map_err(|error| format!("invalid token-expires-at timestamp: {error}"))
    })
    .transpose()
}
