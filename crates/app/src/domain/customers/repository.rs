//! Customers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use krua::language::Language;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    auth::AuthUserUuid,
    domain::customers::models::{Customer, CustomerUpdate, CustomerUuid, NewCustomer},
};

const CREATE_CUSTOMER_SQL: &str = include_str!("sql/create_customer.sql");
const UPDATE_CUSTOMER_FOR_USER_SQL: &str = include_str!("sql/update_customer_for_user.sql");
const GET_CUSTOMER_FOR_USER_SQL: &str = include_str!("sql/get_customer_for_user.sql");
const GET_CUSTOMER_SQL: &str = include_str!("sql/get_customer.sql");
const LIST_CUSTOMERS_SQL: &str = include_str!("sql/list_customers.sql");
const LOCK_CUSTOMER_SQL: &str = include_str!("sql/lock_customer.sql");
const LINK_CUSTOMER_SQL: &str = include_str!("sql/link_customer.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: Option<AuthUserUuid>,
        customer: &NewCustomer,
    ) -> Result<Customer, sqlx::Error> {
        query_as::<Postgres, Customer>(CREATE_CUSTOMER_SQL)
            .bind(customer.uuid.into_uuid())
            .bind(user.map(AuthUserUuid::into_uuid))
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(customer.phone.as_deref())
            .bind(customer.preferred_language.code())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_customer_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
        update: &CustomerUpdate,
    ) -> Result<Customer, sqlx::Error> {
        query_as::<Postgres, Customer>(UPDATE_CUSTOMER_FOR_USER_SQL)
            .bind(user.into_uuid())
            .bind(&update.name)
            .bind(&update.email)
            .bind(update.phone.as_deref())
            .bind(update.preferred_language.code())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_customer_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
    ) -> Result<Option<Customer>, sqlx::Error> {
        query_as::<Postgres, Customer>(GET_CUSTOMER_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Customer, sqlx::Error> {
        query_as::<Postgres, Customer>(GET_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_customers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        query_as::<Postgres, Customer>(LIST_CUSTOMERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn lock_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Customer, sqlx::Error> {
        query_as::<Postgres, Customer>(LOCK_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Attach an unlinked customer to `user`. `None` if it was already linked.
    pub(crate) async fn link_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        user: AuthUserUuid,
    ) -> Result<Option<Customer>, sqlx::Error> {
        query_as::<Postgres, Customer>(LINK_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Customer {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let preferred_language = row
            .try_get::<String, _>("preferred_language")?
            .parse::<Language>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "preferred_language".to_string(),
                source: Box::new(e),
            })?;

        let total_orders: i32 = row.try_get("total_orders")?;

        let total_orders = u32::try_from(total_orders).map_err(|e| sqlx::Error::ColumnDecode {
            index: "total_orders".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            auth_user_uuid: row
                .try_get::<Option<Uuid>, _>("auth_user_uuid")?
                .map(AuthUserUuid::from_uuid),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            preferred_language,
            total_orders,
            total_spent: row.try_get("total_spent")?,
            last_order_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_order_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
