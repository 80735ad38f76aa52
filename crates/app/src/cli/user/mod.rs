use clap::{Args, Subcommand};
use krua_app::auth::{AuthRepository, AuthUserUuid, NewAuthUser, PgAuthRepository};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Register a login identity
    Create(CreateUserArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Email address of the new user
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::Create(args) => create(args).await,
    }
}

async fn create(args: CreateUserArgs) -> Result<(), String> {
    let email = args.email.trim();

    if email.is_empty() || !email.contains('@') {
        return Err("email must be a valid address".to_string());
    }

    let repository = PgAuthRepository::new(args.database.connect().await?);

    let user = repository
        .create_user(&NewAuthUser {
            uuid: AuthUserUuid::new(),
            email: email.to_string(),
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("roles: user");

    Ok(())
}
