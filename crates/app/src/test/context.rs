//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    audit::PgAuditService,
    auth::{AuthServiceError, AuthUserUuid, NewAuthUser, PgAuthService, TokenPepper},
    database::Db,
    domain::{
        contact::PgContactService,
        customers::PgCustomersService,
        orders::{PgOrdersService, StoreSettings},
        products::PgProductsService,
        users::PgUsersService,
    },
    notifications::DisabledNotifier,
};

use super::db::TestDb;

const TEST_PEPPER: &str = "krua-test-pepper";

/// Every service wired to one fresh database. Orders use a disabled notifier;
/// tests that care about notifications build their own orders service.
pub(crate) struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub customers: PgCustomersService,
    pub orders: PgOrdersService,
    pub contact: PgContactService,
    pub users: PgUsersService,
    pub audit: PgAuditService,
    pub auth: PgAuthService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            customers: PgCustomersService::new(db.clone()),
            orders: PgOrdersService::new(
                db.clone(),
                Arc::new(DisabledNotifier),
                StoreSettings::default(),
            ),
            contact: PgContactService::new(db.clone()),
            users: PgUsersService::new(db.clone()),
            audit: PgAuditService::new(db),
            auth: PgAuthService::new(test_db.pool().clone(), TokenPepper::new(TEST_PEPPER)),
            db: test_db,
        }
    }

    /// A [`Db`] handle on the test database, for building extra services.
    pub fn app_db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }

    pub async fn create_user(&self, email: &str) -> Result<AuthUserUuid, AuthServiceError> {
        let user = self
            .auth
            .create_user(NewAuthUser {
                uuid: AuthUserUuid::new(),
                email: email.to_string(),
            })
            .await?;

        Ok(user.uuid)
    }
}
