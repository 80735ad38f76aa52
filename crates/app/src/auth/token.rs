//! Access token formatting, parsing and verifier hashing.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::auth::AuthUserUuid;

/// Access token identifier prefix.
pub const ACCESS_TOKEN_PREFIX: &str = "kr";

/// Number of secret bytes encoded in a token.
pub const ACCESS_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTokenVersion {
    V1,
}

impl AccessTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for AccessTokenVersion {
    type Error = AccessTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(AccessTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for AccessTokenVersion {
    type Err = AccessTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(AccessTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Clone)]
pub struct AccessTokenSecret {
    bytes: [u8; ACCESS_TOKEN_SECRET_BYTES],
}

impl AccessTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ACCESS_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ACCESS_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for AccessTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessTokenSecret(**redacted**)")
    }
}

impl Drop for AccessTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Server-side secret mixed into every token hash, so a leaked
/// `access_tokens` table cannot be replayed without it.
#[derive(Clone)]
pub struct TokenPepper(String);

impl TokenPepper {
    #[must_use]
    pub fn new(pepper: impl Into<String>) -> Self {
        Self(pepper.into())
    }
}

impl fmt::Debug for TokenPepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPepper(**redacted**)")
    }
}

impl Drop for TokenPepper {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedAccessToken {
    pub token_uuid: Uuid,
    pub version: AccessTokenVersion,
    pub secret: AccessTokenSecret,
}

#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error("access token format is invalid")]
    InvalidFormat,

    #[error("access token uses an unsupported version")]
    UnsupportedVersion,

    #[error("access token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_access_token_secret() -> AccessTokenSecret {
    let mut secret = [0_u8; ACCESS_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    AccessTokenSecret::from_bytes(secret)
}

/// Format a bearer token as `kr_v1_<token uuid hex>.<secret hex>`.
#[must_use]
pub fn format_access_token(
    token_uuid: Uuid,
    version: AccessTokenVersion,
    secret: &AccessTokenSecret,
) -> String {
    format!(
        "{ACCESS_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        hex::encode(secret.as_bytes())
    )
}

/// Parse a bearer token.
///
/// # Errors
///
/// Returns an error when the prefix, version, uuid or secret is malformed.
pub fn parse_access_token(token: &str) -> Result<ParsedAccessToken, AccessTokenError> {
    let (prefix_and_id, secret_hex) = token
        .split_once('.')
        .ok_or(AccessTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(AccessTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(AccessTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(AccessTokenError::InvalidFormat)?;

    if prefix != ACCESS_TOKEN_PREFIX {
        return Err(AccessTokenError::InvalidFormat);
    }

    let version = AccessTokenVersion::from_str(version_segment)?;

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_| AccessTokenError::InvalidFormat)?;

    let mut secret = [0_u8; ACCESS_TOKEN_SECRET_BYTES];

    hex::decode_to_slice(secret_hex, &mut secret)
        .map_err(|_| AccessTokenError::InvalidSecretEncoding)?;

    Ok(ParsedAccessToken {
        token_uuid,
        version,
        secret: AccessTokenSecret::from_bytes(secret),
    })
}

/// Hash the canonical verifier input for a token.
///
/// Input: `{pepper}{token_uuid_hex}:{version}:{user_uuid_hex}:{secret_hex}`, hex-encoded SHA-256.
#[must_use]
pub fn hash_access_token(
    pepper: &TokenPepper,
    token_uuid: &Uuid,
    version: AccessTokenVersion,
    user_uuid: AuthUserUuid,
    secret: &AccessTokenSecret,
) -> String {
    let mut input = format!(
        "{}:{}:{}:{}",
        token_uuid.simple(),
        version.as_i16(),
        user_uuid.into_uuid().simple(),
        hex::encode(secret.as_bytes()),
    );

    let mut hasher = Sha256::new();
    hasher.update(pepper.0.as_bytes());
    hasher.update(input.as_bytes());
    input.zeroize();

    hex::encode(hasher.finalize())
}

/// Compare two hashes without short-circuiting on the first differing byte.
#[must_use]
pub fn hashes_match(expected: &str, actual: &str) -> bool {
    let expected = expected.as_bytes();
    let actual = actual.as_bytes();

    if expected.len() != actual.len() {
        return false;
    }

    expected
        .iter()
        .zip(actual)
        .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
        == 0
}
