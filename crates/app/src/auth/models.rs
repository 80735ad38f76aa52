//! Auth data models.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AccessTokenVersion,
    uuids::TypedUuid,
};

/// Auth User UUID
pub type AuthUserUuid = TypedUuid<AuthUser>;

/// A login identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthUser {
    pub uuid: AuthUserUuid,
    pub email: String,
    pub created_at: Timestamp,
}

/// New auth user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthUser {
    pub uuid: AuthUserUuid,
    pub email: String,
}

/// Roles granted through `user_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
        }
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    #[must_use]
    pub const fn satisfies(self, required: Role) -> bool {
        matches!(
            (self, required),
            (Self::Admin, _)
                | (Self::Moderator, Self::Moderator | Self::User)
                | (Self::User, Self::User)
        )
    }

    /// Admin and moderator are staff roles.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_uuid: AuthUserUuid,
    pub roles: Vec<Role>,
    pub mfa_verified: bool,
}

impl Principal {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Access token data used during bearer authentication.
#[derive(Debug, Clone)]
pub struct ActiveAccessToken {
    pub user_uuid: AuthUserUuid,
    pub version: AccessTokenVersion,
    pub token_hash: String,
    pub mfa_verified: bool,
}

/// Access token metadata persisted in storage.
#[derive(Debug, Clone)]
pub struct AccessTokenMetadata {
    pub uuid: Uuid,
    pub user_uuid: AuthUserUuid,
    pub version: AccessTokenVersion,
    pub mfa_verified: bool,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// New access token persistence payload.
#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub uuid: Uuid,
    pub user_uuid: AuthUserUuid,
    pub version: AccessTokenVersion,
    pub token_hash: String,
    pub mfa_verified: bool,
    pub expires_at: Option<Timestamp>,
}

/// Access token issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub metadata: AccessTokenMetadata,
}
