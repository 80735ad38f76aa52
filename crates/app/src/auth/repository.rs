//! Auth repository.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::auth::{
    AccessTokenMetadata, AccessTokenVersion, AuthUser, AuthUserUuid, NewAccessToken,
    NewAuthUser, Role, ActiveAccessToken,
};

const FIND_ACTIVE_ACCESS_TOKEN_SQL: &str = include_str!("sql/find_active_access_token.sql");
const TOUCH_ACCESS_TOKEN_LAST_USED_SQL: &str =
    include_str!("sql/touch_access_token_last_used.sql");
const LIST_ROLES_FOR_USER_SQL: &str = include_str!("sql/list_roles_for_user.sql");
const CREATE_ACCESS_TOKEN_SQL: &str = include_str!("sql/create_access_token.sql");
const LIST_ACCESS_TOKENS_BY_USER_SQL: &str = include_str!("sql/list_access_tokens_by_user.sql");
const REVOKE_ACCESS_TOKEN_SQL: &str = include_str!("sql/revoke_access_token.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const GRANT_ROLE_SQL: &str = include_str!("sql/grant_role.sql");
const REVOKE_ROLE_SQL: &str = include_str!("sql/revoke_role.sql");

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn find_active_access_token(
        &self,
        token_uuid: Uuid,
        version: AccessTokenVersion,
    ) -> Result<Option<ActiveAccessToken>, sqlx::Error> {
        query_as::<Postgres, ActiveAccessToken>(FIND_ACTIVE_ACCESS_TOKEN_SQL)
            .bind(token_uuid)
            .bind(version.as_i16())
            .fetch_optional(&self.pool)
            .await
    }

    async fn touch_access_token_last_used(&self, token_uuid: Uuid) -> Result<(), sqlx::Error> {
        query(TOUCH_ACCESS_TOKEN_LAST_USED_SQL)
            .bind(token_uuid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_roles(&self, user: AuthUserUuid) -> Result<Vec<Role>, sqlx::Error> {
        let names: Vec<String> = query_scalar(LIST_ROLES_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&self.pool)
            .await?;

        names
            .iter()
            .map(|name| {
                name.parse::<Role>().map_err(|error| sqlx::Error::ColumnDecode {
                    index: "role".to_string(),
                    source: Box::new(error),
                })
            })
            .collect()
    }

    async fn create_access_token(
        &self,
        token: &NewAccessToken,
    ) -> Result<AccessTokenMetadata, sqlx::Error> {
        query_as::<Postgres, AccessTokenMetadata>(CREATE_ACCESS_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.user_uuid.into_uuid())
            .bind(token.version.as_i16())
            .bind(&token.token_hash)
            .bind(token.mfa_verified)
            .bind(token.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&self.pool)
            .await
    }

    async fn list_access_tokens_by_user(
        &self,
        user: AuthUserUuid,
    ) -> Result<Vec<AccessTokenMetadata>, sqlx::Error> {
        query_as::<Postgres, AccessTokenMetadata>(LIST_ACCESS_TOKENS_BY_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&self.pool)
            .await
    }

    async fn revoke_access_token(&self, token_uuid: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        query_scalar(REVOKE_ACCESS_TOKEN_SQL)
            .bind(token_uuid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_user(&self, user: &NewAuthUser) -> Result<AuthUser, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let created = query_as::<Postgres, AuthUser>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.email)
            .fetch_one(&mut *tx)
            .await?;

        query(GRANT_ROLE_SQL)
            .bind(created.uuid.into_uuid())
            .bind(Role::User.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(&self, user: AuthUserUuid) -> Result<AuthUser, sqlx::Error> {
        query_as::<Postgres, AuthUser>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    async fn grant_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, sqlx::Error> {
        let rows_affected = query(GRANT_ROLE_SQL)
            .bind(user.into_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn revoke_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, sqlx::Error> {
        let rows_affected = query(REVOKE_ROLE_SQL)
            .bind(user.into_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[automock]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Find a token that is neither revoked nor expired.
    async fn find_active_access_token(
        &self,
        token_uuid: Uuid,
        version: AccessTokenVersion,
    ) -> Result<Option<ActiveAccessToken>, sqlx::Error>;

    async fn touch_access_token_last_used(&self, token_uuid: Uuid) -> Result<(), sqlx::Error>;

    async fn list_roles(&self, user: AuthUserUuid) -> Result<Vec<Role>, sqlx::Error>;

    async fn create_access_token(
        &self,
        token: &NewAccessToken,
    ) -> Result<AccessTokenMetadata, sqlx::Error>;

    async fn list_access_tokens_by_user(
        &self,
        user: AuthUserUuid,
    ) -> Result<Vec<AccessTokenMetadata>, sqlx::Error>;

    /// Returns the token uuid when an active token was revoked.
    async fn revoke_access_token(&self, token_uuid: Uuid) -> Result<Option<Uuid>, sqlx::Error>;

    /// Insert a login that holds the `user` role, so it can reach the
    /// customer routes straight away.
    async fn create_user(&self, user: &NewAuthUser) -> Result<AuthUser, sqlx::Error>;

    async fn get_user(&self, user: AuthUserUuid) -> Result<AuthUser, sqlx::Error>;

    /// Returns `false` when the role was already held.
    async fn grant_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, sqlx::Error>;

    /// Returns `false` when the role was not held.
    async fn revoke_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, sqlx::Error>;
}

fn decode_version(row: &PgRow) -> sqlx::Result<AccessTokenVersion> {
    AccessTokenVersion::try_from(row.try_get::<i16, _>("version")?).map_err(|error| {
        sqlx::Error::ColumnDecode {
            index: "version".to_string(),
            source: Box::new(error),
        }
    })
}

impl<'r> FromRow<'r, PgRow> for ActiveAccessToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_uuid: row.try_get::<Uuid, _>("user_uuid")?.into(),
            version: decode_version(row)?,
            token_hash: row.try_get("token_hash")?,
            mfa_verified: row.try_get("mfa_verified")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AccessTokenMetadata {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get("uuid")?,
            user_uuid: row.try_get::<Uuid, _>("user_uuid")?.into(),
            version: decode_version(row)?,
            mfa_verified: row.try_get("mfa_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AuthUser {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get::<Uuid, _>("uuid")?.into(),
            email: row.try_get("email")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
