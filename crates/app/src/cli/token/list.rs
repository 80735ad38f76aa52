use clap::Args;
use krua_app::auth::{AuthRepository, AuthUserUuid, PgAuthRepository};
use uuid::Uuid;

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User whose tokens should be listed
    #[arg(long)]
    user_uuid: Uuid,
}

pub(crate) async fn run(args: ListTokensArgs) -> Result<(), String> {
    let repository = PgAuthRepository::new(args.database.connect().await?);

    let tokens = repository
        .list_access_tokens_by_user(AuthUserUuid::from_uuid(args.user_uuid))
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    if tokens.is_empty() {
        println!("no tokens found for user {}", args.user_uuid);
        return Ok(());
    }

    let display = |value: Option<jiff::Timestamp>, fallback: &str| {
        value.map_or_else(|| fallback.to_string(), |value| value.to_string())
    };

    for token in tokens {
        println!("token_uuid: {}", token.uuid);
        println!("token_version: {}", token.version.as_i16());
        println!("mfa_verified: {}", token.mfa_verified);
        println!("created_at: {}", token.created_at);
        println!("last_used_at: {}", display(token.last_used_at, "never"));
        println!("expires_at: {}", display(token.expires_at, "none"));
        println!("revoked_at: {}", display(token.revoked_at, "active"));
        println!();
    }

    Ok(())
}
