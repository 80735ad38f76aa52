//! User administration service.

use async_trait::async_trait;
use krua::language::Language;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{AuthUser, AuthUserUuid},
    database::Db,
    domain::{
        customers::{
            models::{Customer, CustomerUuid, NewCustomer},
            repository::PgCustomersRepository,
        },
        users::{
            errors::UsersServiceError,
            models::{DeletionPreview, DeletionReport, LinkTarget},
            repository::PgUsersRepository,
        },
        validation,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    users: PgUsersRepository,
    customers: PgCustomersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            users: PgUsersRepository::new(),
            customers: PgCustomersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn preview_user_deletion(
        &self,
        user: AuthUserUuid,
    ) -> Result<DeletionPreview, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let account = self.users.lock_user(&mut tx, user).await?;
        let rows = self.users.count_dependent_rows(&mut tx, user).await?;

        tx.commit().await?;

        Ok(DeletionPreview {
            user_uuid: account.uuid,
            email: account.email,
            rows,
        })
    }

    async fn delete_user(
        &self,
        actor: AuthUserUuid,
        user: AuthUserUuid,
    ) -> Result<DeletionReport, UsersServiceError> {
        if actor == user {
            return Err(UsersServiceError::CannotDeleteSelf);
        }

        let mut tx = self.db.begin_transaction().await?;

        let account = self.users.lock_user(&mut tx, user).await?;
        let deleted = self.users.delete_user_cascade(&mut tx, user).await?;

        tx.commit().await?;

        info!(
            user_uuid = %user,
            actor_uuid = %actor,
            orders = deleted.orders,
            customers = deleted.customers,
            "user deleted"
        );

        Ok(DeletionReport {
            user_uuid: account.uuid,
            email: account.email,
            deleted,
        })
    }

    async fn list_orphaned_users(&self) -> Result<Vec<AuthUser>, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let users = self.users.list_orphaned_users(&mut tx).await?;

        tx.commit().await?;

        Ok(users)
    }

    async fn link_orphan(
        &self,
        user: AuthUserUuid,
        target: LinkTarget,
    ) -> Result<Customer, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let account = self.users.lock_user(&mut tx, user).await?;

        if self
            .customers
            .find_customer_for_user(&mut tx, user)
            .await?
            .is_some()
        {
            return Err(UsersServiceError::AlreadyLinked);
        }

        let customer = match target {
            LinkTarget::Existing(customer) => {
                match self.customers.link_customer(&mut tx, customer, user).await? {
                    Some(linked) => linked,
                    None => {
                        return Err(
                            match self.customers.get_customer(&mut tx, customer).await {
                                Ok(_) => UsersServiceError::AlreadyLinked,
                                Err(sqlx::Error::RowNotFound) => {
                                    UsersServiceError::CustomerNotFound
                                }
                                Err(error) => error.into(),
                            },
                        );
                    }
                }
            }
            LinkTarget::New { name, phone } => {
                let customer = NewCustomer {
                    uuid: CustomerUuid::new(),
                    name: validation::required("name", &name)?,
                    email: account.email,
                    phone: validation::optional(phone.as_deref()),
                    preferred_language: Language::default(),
                };

                self.customers
                    .create_customer(&mut tx, Some(user), &customer)
                    .await?
            }
        };

        self.users.grant_user_role(&mut tx, user).await?;

        tx.commit().await?;

        info!(user_uuid = %user, customer_uuid = %customer.uuid, "orphaned user linked");

        Ok(customer)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Count what [`delete_user`](Self::delete_user) would remove.
    async fn preview_user_deletion(
        &self,
        user: AuthUserUuid,
    ) -> Result<DeletionPreview, UsersServiceError>;

    /// Delete a user and everything that belongs to them in one transaction.
    ///
    /// Stock from deleted orders is not returned.
    async fn delete_user(
        &self,
        actor: AuthUserUuid,
        user: AuthUserUuid,
    ) -> Result<DeletionReport, UsersServiceError>;

    /// Logins without a customer profile.
    async fn list_orphaned_users(&self) -> Result<Vec<AuthUser>, UsersServiceError>;

    async fn link_orphan(
        &self,
        user: AuthUserUuid,
        target: LinkTarget,
    ) -> Result<Customer, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use krua::shipping::ShippingMethod;
    use testresult::TestResult;

    use crate::{
        auth::{AuthRepository, PgAuthRepository, Role},
        domain::{
            customers::CustomersService,
            orders::{
                OrdersService,
                models::{NewOrder, OrderFilter, OrderLine, OrderUuid},
            },
            products::{ProductsService, models::ProductUuid},
        },
        test::{
            TestContext,
            helpers::{address, new_customer, new_product},
        },
    };

    use super::*;

    /// A user with the default role, a customer profile and one order.
    async fn shopper_with_order(
        ctx: &TestContext,
        email: &str,
        product: ProductUuid,
    ) -> TestResult<AuthUserUuid> {
        let user = ctx.create_user(email).await?;

        ctx.customers
            .create_customer(user, new_customer(CustomerUuid::new(), email))
            .await?;
        ctx.orders
            .place_order(
                user,
                NewOrder {
                    uuid: OrderUuid::new(),
                    lines: vec![OrderLine {
                        product_uuid: product,
                        quantity: 2,
                    }],
                    shipping_method: ShippingMethod::Collection,
                    shipping_address: address(),
                    billing_address: None,
                },
            )
            .await?;

        Ok(user)
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn preview_counts_match_deletion() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let admin = ctx.create_user("admin@example.com").await?;
        let doomed = shopper_with_order(&ctx, "doomed@example.com", product).await?;
        let other = shopper_with_order(&ctx, "other@example.com", product).await?;

        let preview = ctx.users.preview_user_deletion(doomed).await?;

        assert_eq!(preview.email, "doomed@example.com");
        assert_eq!(preview.rows.user_roles, 1);
        assert_eq!(preview.rows.customers, 1);
        assert_eq!(preview.rows.orders, 1);
        assert_eq!(preview.rows.order_items, 1);

        let report = ctx.users.delete_user(admin, doomed).await?;

        assert_eq!(report.deleted, preview.rows);

        let remaining = ctx.orders.list_orders(OrderFilter::default()).await?;

        assert_eq!(remaining.len(), 1);
        assert!(ctx.customers.get_customer_for_user(other).await.is_ok());

        // Deleting a user's orders does not return their stock.
        assert_eq!(ctx.products.get_product(product).await?.stock, 6);

        let gone = ctx.users.preview_user_deletion(doomed).await;

        assert!(matches!(gone, Err(UsersServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn admins_cannot_delete_themselves() -> TestResult {
        let ctx = TestContext::new().await;
        let admin = ctx.create_user("admin@example.com").await?;

        let result = ctx.users.delete_user(admin, admin).await;

        assert!(matches!(result, Err(UsersServiceError::CannotDeleteSelf)));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn orphans_can_be_linked_to_a_new_customer() -> TestResult {
        let ctx = TestContext::new().await;
        let orphan = ctx.create_user("orphan@example.com").await?;

        let orphans = ctx.users.list_orphaned_users().await?;

        assert_eq!(orphans.iter().map(|u| u.uuid).collect::<Vec<_>>(), vec![orphan]);

        let customer = ctx
            .users
            .link_orphan(
                orphan,
                LinkTarget::New {
                    name: "Orphan".to_string(),
                    phone: None,
                },
            )
            .await?;

        assert_eq!(customer.email, "orphan@example.com");
        assert_eq!(customer.auth_user_uuid, Some(orphan));
        assert_eq!(
            PgAuthRepository::new(ctx.db.pool().clone())
                .list_roles(orphan)
                .await?,
            vec![Role::User]
        );
        assert!(ctx.users.list_orphaned_users().await?.is_empty());

        let again = ctx
            .users
            .link_orphan(
                orphan,
                LinkTarget::New {
                    name: "Orphan".to_string(),
                    phone: None,
                },
            )
            .await;

        assert!(matches!(again, Err(UsersServiceError::AlreadyLinked)));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn linking_to_someone_elses_customer_fails() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_user("owner@example.com").await?;
        let orphan = ctx.create_user("orphan@example.com").await?;

        let owned = ctx
            .customers
            .create_customer(owner, new_customer(CustomerUuid::new(), "owner@example.com"))
            .await?;

        let result = ctx
            .users
            .link_orphan(orphan, LinkTarget::Existing(owned.uuid))
            .await;

        assert!(matches!(result, Err(UsersServiceError::AlreadyLinked)));

        let missing = ctx
            .users
            .link_orphan(orphan, LinkTarget::Existing(CustomerUuid::new()))
            .await;

        assert!(matches!(missing, Err(UsersServiceError::CustomerNotFound)));

        Ok(())
    }
}
