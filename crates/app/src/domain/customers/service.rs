//! Customers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::AuthUserUuid,
    database::Db,
    domain::{
        customers::{
            errors::CustomersServiceError,
            models::{Customer, CustomerUpdate, CustomerUuid, NewCustomer},
            repository::PgCustomersRepository,
        },
        validation,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

fn validate_new(customer: NewCustomer) -> Result<NewCustomer, CustomersServiceError> {
    Ok(NewCustomer {
        name: validation::required("name", &customer.name)?,
        email: validation::email("email", &customer.email)?,
        phone: validation::optional(customer.phone.as_deref()),
        ..customer
    })
}

fn validate_update(update: CustomerUpdate) -> Result<CustomerUpdate, CustomersServiceError> {
    Ok(CustomerUpdate {
        name: validation::required("name", &update.name)?,
        email: validation::email("email", &update.email)?,
        phone: validation::optional(update.phone.as_deref()),
        ..update
    })
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn create_customer(
        &self,
        user: AuthUserUuid,
        customer: NewCustomer,
    ) -> Result<Customer, CustomersServiceError> {
        let customer = validate_new(customer)?;

        let mut tx = self.db.begin_transaction().await?;

        if self
            .repository
            .find_customer_for_user(&mut tx, user)
            .await?
            .is_some()
        {
            return Err(CustomersServiceError::AlreadyExists);
        }

        let created = self
            .repository
            .create_customer(&mut tx, Some(user), &customer)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_customer(
        &self,
        user: AuthUserUuid,
        update: CustomerUpdate,
    ) -> Result<Customer, CustomersServiceError> {
        let update = validate_update(update)?;

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update_customer_for_user(&mut tx, user, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn get_customer_for_user(
        &self,
        user: AuthUserUuid,
    ) -> Result<Customer, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let customer = self
            .repository
            .find_customer_for_user(&mut tx, user)
            .await?
            .ok_or(CustomersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(customer)
    }

    async fn get_customer(&self, customer: CustomerUuid) -> Result<Customer, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let customer = self.repository.get_customer(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(customer)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let customers = self.repository.list_customers(&mut tx).await?;

        tx.commit().await?;

        Ok(customers)
    }
}

#[automock]
#[async_trait]
pub trait CustomersService: Send + Sync {
    /// Create the customer profile for a newly signed-up user.
    async fn create_customer(
        &self,
        user: AuthUserUuid,
        customer: NewCustomer,
    ) -> Result<Customer, CustomersServiceError>;

    /// Edit the caller's own profile.
    async fn update_customer(
        &self,
        user: AuthUserUuid,
        update: CustomerUpdate,
    ) -> Result<Customer, CustomersServiceError>;

    async fn get_customer_for_user(
        &self,
        user: AuthUserUuid,
    ) -> Result<Customer, CustomersServiceError>;

    async fn get_customer(&self, customer: CustomerUuid) -> Result<Customer, CustomersServiceError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, CustomersServiceError>;
}

#[cfg(test)]
mod tests {
    use krua::language::Language;
    use testresult::TestResult;

    use crate::{
        domain::validation::ValidationError,
        test::{TestContext, helpers::new_customer},
    };

    use super::*;

    #[test]
    fn validation_trims_and_drops_blank_phone() -> TestResult {
        let customer = validate_new(NewCustomer {
            name: "  Malee ".to_string(),
            phone: Some("  ".to_string()),
            ..new_customer(CustomerUuid::new(), "malee@example.com")
        })?;

        assert_eq!(customer.name, "Malee");
        assert_eq!(customer.phone, None);

        Ok(())
    }

    #[test]
    fn validation_rejects_bad_email() {
        let result = validate_new(new_customer(CustomerUuid::new(), "not-an-email"));

        assert!(matches!(
            result,
            Err(CustomersServiceError::Validation(ValidationError::InvalidEmail("email")))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn create_customer_links_to_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("malee@example.com").await?;
        let uuid = CustomerUuid::new();

        let customer = ctx
            .customers
            .create_customer(user, new_customer(uuid, "malee@example.com"))
            .await?;

        assert_eq!(customer.uuid, uuid);
        assert_eq!(customer.auth_user_uuid, Some(user));
        assert_eq!(customer.total_orders, 0);

        let fetched = ctx.customers.get_customer_for_user(user).await?;

        assert_eq!(fetched, customer);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn second_customer_for_same_user_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("malee@example.com").await?;

        ctx.customers
            .create_customer(user, new_customer(CustomerUuid::new(), "malee@example.com"))
            .await?;

        let result = ctx
            .customers
            .create_customer(user, new_customer(CustomerUuid::new(), "malee@example.com"))
            .await;

        assert!(
            matches!(result, Err(CustomersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn update_customer_edits_own_profile() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("malee@example.com").await?;

        ctx.customers
            .create_customer(user, new_customer(CustomerUuid::new(), "malee@example.com"))
            .await?;

        let updated = ctx
            .customers
            .update_customer(
                user,
                CustomerUpdate {
                    name: "Malee S.".to_string(),
                    email: "malee@example.com".to_string(),
                    phone: Some("0812345678".to_string()),
                    preferred_language: Language::Th,
                },
            )
            .await?;

        assert_eq!(updated.name, "Malee S.");
        assert_eq!(updated.preferred_language, Language::Th);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn update_without_profile_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("malee@example.com").await?;

        let result = ctx
            .customers
            .update_customer(
                user,
                CustomerUpdate {
                    name: "Malee".to_string(),
                    email: "malee@example.com".to_string(),
                    phone: None,
                    preferred_language: Language::En,
                },
            )
            .await;

        assert!(matches!(result, Err(CustomersServiceError::NotFound)));

        Ok(())
    }
}
