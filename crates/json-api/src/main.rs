//! Krua JSON API Server

use std::process;

use rusty_money::iso;
use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use krua_app::{
    auth::{AccessPolicy, TokenPepper},
    context::{AppContext, AppSettings},
    database,
    domain::orders::StoreSettings,
};

use crate::{
    config::ServerConfig,
    observability::Observability,
    rate_limit::{RateLimitSettings, RateLimiter},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod checkout;
mod config;
mod contact;
mod customers;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod payments;
mod products;
mod rate_limit;
mod router;
mod schemas;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;

/// Krua JSON API Server entry point
///
/// # Panics
///
/// Panics if the server fails to bind or serve requests
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging failed to initialize, must use eprintln"
            )]
            {
                eprintln!("Observability error: {init_error}");
            }

            process::exit(1);
        }
    };

    let Some(currency) = iso::find(config.store.currency.trim()) else {
        error!("unknown currency code: {}", config.store.currency);

        process::exit(1);
    };

    let pool = match database::connect(&config.database.database_url).await {
        Ok(pool) => pool,
        Err(connect_error) => {
            error!("failed to connect to database: {connect_error}");

            process::exit(1);
        }
    };

    if config.database.run_migrations {
        if let Err(migrate_error) = database::migrate(&pool).await {
            error!("failed to run migrations: {migrate_error}");

            process::exit(1);
        }

        info!("database migrations applied");
    }

    let functions = config.notifications.functions_config();

    if functions.is_none() {
        info!("FUNCTIONS_URL not set, order emails are disabled");
    }

    let settings = AppSettings {
        token_pepper: TokenPepper::new(config.auth.token_pepper.clone()),
        store: StoreSettings {
            vat_rate: config.store.vat_rate,
            currency,
        },
        functions,
    };

    let app = match AppContext::from_pool(pool, settings) {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let state = State::new(
        app,
        AccessPolicy {
            require_mfa_for_staff: config.auth.require_staff_mfa,
        },
        RateLimiter::new(RateLimitSettings {
            max_requests: config.rate_limit.rate_limit_requests,
            window: config.rate_limit.window(),
            capacity: config.rate_limit.rate_limit_capacity,
            trust_forwarded_for: config.rate_limit.trust_forwarded_for,
        }),
        config.payment.payment_gateway_key.clone(),
    );

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(state.into_shared()))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(router::app_router());

    let doc = OpenApi::new("Krua API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);
    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    observability.shutdown();
}
