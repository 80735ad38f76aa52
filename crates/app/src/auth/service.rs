//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{
    AccessTokenMetadata, AccessTokenVersion, AuthServiceError, AuthUser, AuthUserUuid,
    IssuedAccessToken, NewAccessToken, NewAuthUser, Principal, Role, TokenPepper,
    format_access_token, generate_access_token_secret, hash_access_token, hashes_match,
    parse_access_token,
    repository::{AuthRepository, PgAuthRepository},
};

#[derive(Clone)]
pub struct PgAuthService {
    repository: Arc<dyn AuthRepository>,
    pepper: TokenPepper,
}

impl std::fmt::Debug for PgAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAuthService")
            .field("pepper", &self.pepper)
            .finish_non_exhaustive()
    }
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool, pepper: TokenPepper) -> Self {
        Self::with_repository(Arc::new(PgAuthRepository::new(pool)), pepper)
    }

    #[must_use]
    pub fn with_repository(repository: Arc<dyn AuthRepository>, pepper: TokenPepper) -> Self {
        Self { repository, pepper }
    }

    /// Register a login identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the email is taken.
    pub async fn create_user(&self, user: NewAuthUser) -> Result<AuthUser, AuthServiceError> {
        Ok(self.repository.create_user(&user).await?)
    }

    /// Issue a new access token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or database insertion fails.
    pub async fn issue_access_token(
        &self,
        user: AuthUserUuid,
        mfa_verified: bool,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedAccessToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let version = AccessTokenVersion::V1;
        let secret = generate_access_token_secret();
        let token = format_access_token(token_uuid, version, &secret);
        let token_hash = hash_access_token(&self.pepper, &token_uuid, version, user, &secret);

        let metadata = self
            .repository
            .create_access_token(&NewAccessToken {
                uuid: token_uuid,
                user_uuid: user,
                version,
                token_hash,
                mfa_verified,
                expires_at,
            })
            .await?;

        Ok(IssuedAccessToken { token, metadata })
    }

    /// List all tokens for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_access_tokens(
        &self,
        user: AuthUserUuid,
    ) -> Result<Vec<AccessTokenMetadata>, AuthServiceError> {
        Ok(self.repository.list_access_tokens_by_user(user).await?)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_access_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        self.repository
            .revoke_access_token(token_uuid)
            .await
            .map(|record| record.is_some())
            .map_err(AuthServiceError::from)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed_token =
            parse_access_token(bearer_token).map_err(|_| AuthServiceError::NotFound)?;

        let token = self
            .repository
            .find_active_access_token(parsed_token.token_uuid, parsed_token.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if token.version != parsed_token.version {
            return Err(AuthServiceError::NotFound);
        }

        let expected = hash_access_token(
            &self.pepper,
            &parsed_token.token_uuid,
            parsed_token.version,
            token.user_uuid,
            &parsed_token.secret,
        );

        if !hashes_match(&expected, &token.token_hash) {
            return Err(AuthServiceError::NotFound);
        }

        let roles = self.repository.list_roles(token.user_uuid).await?;

        if let Err(error) = self
            .repository
            .touch_access_token_last_used(parsed_token.token_uuid)
            .await
        {
            warn!(%error, token_uuid = %parsed_token.token_uuid, "failed to touch access token");
        }

        Ok(Principal {
            user_uuid: token.user_uuid,
            roles,
            mfa_verified: token.mfa_verified,
        })
    }

    async fn grant_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, AuthServiceError> {
        Ok(self.repository.grant_role(user, role).await?)
    }

    async fn revoke_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, AuthServiceError> {
        Ok(self.repository.revoke_role(user, role).await?)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the principal it was issued to.
    ///
    /// Every failure the caller could have caused is reported as
    /// [`AuthServiceError::NotFound`].
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;

    /// Grant a role. Returns `false` when it was already held.
    async fn grant_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, AuthServiceError>;

    /// Revoke a role. Returns `false` when it was not held.
    async fn revoke_role(&self, user: AuthUserUuid, role: Role) -> Result<bool, AuthServiceError>;
}
