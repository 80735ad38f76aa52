//! The role gate shared by every protected route.

use thiserror::Error;

use crate::auth::{Principal, Role};

/// Site-wide access policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Staff routes also require a token issued after a second factor.
    pub require_mfa_for_staff: bool,
}

/// Why a principal was turned away.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("{required} role required")]
    MissingRole { required: Role },

    #[error("multi-factor authentication required")]
    MfaRequired,
}

/// Check that `principal` may act with the `required` role.
///
/// # Errors
///
/// - [`AccessDenied::MissingRole`]: none of the principal's roles satisfies `required`.
/// - [`AccessDenied::MfaRequired`]: `required` is a staff role, the policy demands MFA
///   for staff, and the token was not MFA verified.
pub fn authorize(
    principal: &Principal,
    required: Role,
    policy: AccessPolicy,
) -> Result<(), AccessDenied> {
    if !principal.roles.iter().any(|role| role.satisfies(required)) {
        return Err(AccessDenied::MissingRole { required });
    }

    if policy.require_mfa_for_staff && required.is_staff() && !principal.mfa_verified {
        return Err(AccessDenied::MfaRequired);
    }

    Ok(())
}
