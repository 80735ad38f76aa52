//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::{
    audit::{AuditService, PgAuditService},
    auth::{AuthService, PgAuthService, TokenPepper},
    database::{self, Db},
    domain::{
        contact::{ContactService, PgContactService},
        customers::{CustomersService, PgCustomersService},
        orders::{OrdersService, PgOrdersService, StoreSettings},
        products::{PgProductsService, ProductsService},
        users::{PgUsersService, UsersService},
    },
    notifications::{
        DisabledNotifier, FunctionsConfig, FunctionsNotifier, NotificationError, OrderNotifier,
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build notification client")]
    Notifications(#[source] NotificationError),
}

/// Settings the services need beyond a database connection.
#[derive(Debug)]
pub struct AppSettings {
    pub token_pepper: TokenPepper,
    pub store: StoreSettings,

    /// `None` disables order emails; orders wait for a confirmation retry.
    pub functions: Option<FunctionsConfig>,
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub customers: Arc<dyn CustomersService>,
    pub orders: Arc<dyn OrdersService>,
    pub contact: Arc<dyn ContactService>,
    pub users: Arc<dyn UsersService>,
    pub auth: Arc<dyn AuthService>,
    pub audit: Arc<dyn AuditService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or building
    /// the notification client fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Self::from_pool(pool, settings)
    }

    /// Build application context on an existing pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the notification client cannot be built.
    pub fn from_pool(pool: PgPool, settings: AppSettings) -> Result<Self, AppInitError> {
        let notifier = build_notifier(settings.functions)?;
        let db = Db::new(pool.clone());

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            customers: Arc::new(PgCustomersService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone(), notifier, settings.store)),
            contact: Arc::new(PgContactService::new(db.clone())),
            users: Arc::new(PgUsersService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(pool, settings.token_pepper)),
            audit: Arc::new(PgAuditService::new(db)),
        })
    }
}

fn build_notifier(
    functions: Option<FunctionsConfig>,
) -> Result<Arc<dyn OrderNotifier>, AppInitError> {
    match functions {
        Some(config) => {
            info!(url = %config.url, "order notifications enabled");

            Ok(Arc::new(
                FunctionsNotifier::new(config).map_err(AppInitError::Notifications)?,
            ))
        }
        None => {
            info!("no functions url configured; order notifications disabled");

            Ok(Arc::new(DisabledNotifier))
        }
    }
}
