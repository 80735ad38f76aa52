//! User Administration Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::{AuthUser, AuthUserUuid},
    domain::users::models::DependentRows,
};

const LOCK_USER_SQL: &str = include_str!("sql/lock_user.sql");
const COUNT_DEPENDENT_ROWS_SQL: &str = include_str!("sql/count_dependent_rows.sql");
const DELETE_USER_ORDER_ITEMS_SQL: &str = include_str!("sql/delete_user_order_items.sql");
const DELETE_USER_ORDERS_SQL: &str = include_str!("sql/delete_user_orders.sql");
const DELETE_USER_CUSTOMERS_SQL: &str = include_str!("sql/delete_user_customers.sql");
const DELETE_USER_ROLES_SQL: &str = include_str!("sql/delete_user_roles.sql");
const DELETE_USER_ACCESS_TOKENS_SQL: &str = include_str!("sql/delete_user_access_tokens.sql");
const DELETE_AUTH_USER_SQL: &str = include_str!("sql/delete_auth_user.sql");
const LIST_ORPHANED_USERS_SQL: &str = include_str!("sql/list_orphaned_users.sql");
const GRANT_USER_ROLE_SQL: &str = include_str!("sql/grant_user_role.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn lock_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
    ) -> Result<AuthUser, sqlx::Error> {
        query_as::<Postgres, AuthUser>(LOCK_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn count_dependent_rows(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
    ) -> Result<DependentRows, sqlx::Error> {
        query_as::<Postgres, DependentRows>(COUNT_DEPENDENT_ROWS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete everything that references `user`, children first, then the
    /// user itself.
    pub(crate) async fn delete_user_cascade(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
    ) -> Result<DependentRows, sqlx::Error> {
        let order_items = execute(tx, DELETE_USER_ORDER_ITEMS_SQL, user).await?;
        let orders = execute(tx, DELETE_USER_ORDERS_SQL, user).await?;
        let customers = execute(tx, DELETE_USER_CUSTOMERS_SQL, user).await?;
        let user_roles = execute(tx, DELETE_USER_ROLES_SQL, user).await?;
        let access_tokens = execute(tx, DELETE_USER_ACCESS_TOKENS_SQL, user).await?;

        if execute(tx, DELETE_AUTH_USER_SQL, user).await? == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(DependentRows {
            user_roles,
            access_tokens,
            customers,
            orders,
            order_items,
        })
    }

    /// Customers need the `user` role to reach their own routes.
    pub(crate) async fn grant_user_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: AuthUserUuid,
    ) -> Result<(), sqlx::Error> {
        execute(tx, GRANT_USER_ROLE_SQL, user).await.map(|_granted| ())
    }

    pub(crate) async fn list_orphaned_users(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<AuthUser>, sqlx::Error> {
        query_as::<Postgres, AuthUser>(LIST_ORPHANED_USERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

async fn execute(
    tx: &mut Transaction<'_, Postgres>,
    sql: &'static str,
    user: AuthUserUuid,
) -> Result<u64, sqlx::Error> {
    Ok(query(sql)
        .bind(user.into_uuid())
        .execute(&mut **tx)
        .await?
        .rows_affected())
}

fn try_get_count(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let count: i64 = row.try_get(column)?;

    u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for DependentRows {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_roles: try_get_count(row, "user_roles")?,
            access_tokens: try_get_count(row, "access_tokens")?,
            customers: try_get_count(row, "customers")?,
            orders: try_get_count(row, "orders")?,
            order_items: try_get_count(row, "order_items")?,
        })
    }
}
