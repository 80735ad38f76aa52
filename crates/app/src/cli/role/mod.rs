use clap::{Args, Subcommand};
use krua_app::auth::{AuthRepository, AuthUserUuid, PgAuthRepository, Role};
use uuid::Uuid;

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct RoleCommand {
    #[command(subcommand)]
    command: RoleSubcommand,
}

#[derive(Debug, Subcommand)]
enum RoleSubcommand {
    Grant(RoleArgs),
    Revoke(RoleArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RoleArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    #[arg(long)]
    user_uuid: Uuid,

    /// admin, moderator or user
    #[arg(long)]
    role: Role,
}

pub(crate) async fn run(command: RoleCommand) -> Result<(), String> {
    match command.command {
        RoleSubcommand::Grant(args) => {
            let repository = PgAuthRepository::new(args.database.connect().await?);

            let granted = repository
                .grant_role(AuthUserUuid::from_uuid(args.user_uuid), args.role)
                .await
                .map_err(|error| format!("failed to grant role: {error}"))?;

            if granted {
                println!("granted {} to {}", args.role, args.user_uuid);
            } else {
                println!("{} already has {}", args.user_uuid, args.role);
            }

            Ok(())
        }
        RoleSubcommand::Revoke(args) => {
            let repository = PgAuthRepository::new(args.database.connect().await?);

            let revoked = repository
                .revoke_role(AuthUserUuid::from_uuid(args.user_uuid), args.role)
                .await
                .map_err(|error| format!("failed to revoke role: {error}"))?;

            if revoked {
                println!("revoked {} from {}", args.role, args.user_uuid);
            } else {
                println!("{} did not have {}", args.user_uuid, args.role);
            }

            Ok(())
        }
    }
}
