use std::{sync::Arc, time::Duration};

use clap::{Args, Subcommand};
use krua_app::{
    database::Db,
    domain::orders::{OrdersService, PgOrdersService, StoreSettings},
    notifications::{DisabledNotifier, FunctionsConfig, FunctionsNotifier, OrderNotifier},
};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Resend confirmation emails that were never delivered
    RetryConfirmations(RetryConfirmationsArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RetryConfirmationsArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Maximum number of orders to process
    #[arg(long, default_value_t = 100)]
    limit: u32,

    /// Base URL of the email functions
    #[arg(long, env = "FUNCTIONS_URL")]
    functions_url: Option<String>,

    #[arg(long, env = "FUNCTIONS_SERVICE_KEY", hide_env_values = true)]
    functions_service_key: Option<String>,

    #[arg(long, env = "FUNCTIONS_TIMEOUT_SECONDS", default_value_t = 10)]
    functions_timeout_seconds: u64,
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::RetryConfirmations(args) => retry_confirmations(args).await,
    }
}

async fn retry_confirmations(args: RetryConfirmationsArgs) -> Result<(), String> {
    let notifier: Arc<dyn OrderNotifier> = match (args.functions_url, args.functions_service_key)
    {
        (Some(url), Some(service_key)) => Arc::new(
            FunctionsNotifier::new(FunctionsConfig {
                url,
                service_key,
                timeout: Duration::from_secs(args.functions_timeout_seconds),
            })
            .map_err(|error| format!("failed to build notification client: {error}"))?,
        ),
        (None, _) => Arc::new(DisabledNotifier),
        (Some(_), None) => {
            return Err("functions-service-key is required with functions-url".to_string());
        }
    };

    let pool = args.database.connect().await?;
    let orders = PgOrdersService::new(Db::new(pool), notifier, StoreSettings::default());

    let report = orders
        .retry_pending_confirmations(args.limit)
        .await
        .map_err(|error| format!("failed to retry confirmations: {error}"))?;

    println!("attempted: {}", report.attempted);
    println!("sent: {}", report.sent);
    println!("failed: {}", report.failed);

    Ok(())
}
