//! Error types for the access-control engine
//!
//! Every expected business denial is a typed variant with a stable kind and a
//! user-facing message. UI and tests match on the message text, so the
//! Display strings here are part of the contract.

use thiserror::Error;

/// Access-control errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No authenticated principal was supplied
    #[error("Authentication required. Please sign in to access patient data.")]
    Unauthenticated,

    /// No user record matches the supplied email
    #[error("User not found. Please sign in with a valid account.")]
    UserNotFound,

    /// The user exists but has been deactivated
    #[error("Account is inactive. Please contact support.")]
    AccountInactive,

    /// The user's role does not satisfy the check
    #[error("{0}")]
    RoleMismatch(String),

    /// The user belongs to a different tenant than the target resource
    #[error("{0}")]
    TenantMismatch(String),

    /// A referenced resource (e.g. patient record) does not exist
    #[error("{0}")]
    ResourceNotFound(String),

    /// The user has no custom role assigned
    #[error("No permissions assigned to user")]
    NoCustomRole,

    /// The permission path is malformed
    #[error("{0}")]
    PermissionPathInvalid(String),

    /// The permission path does not resolve to a node in the role tree
    #[error("{0}")]
    PermissionPathNotFound(String),

    /// The permission path resolves to a disabled node
    #[error("{0}")]
    PermissionDisabled(String),

    /// No approved support-access request matches the grant shape
    #[error("No approved support access request found")]
    NoApprovedGrant,

    /// A matching request exists but has not been approved yet
    #[error("Support access request is pending approval")]
    GrantPending,

    /// An approved request is missing its expiration timestamp
    #[error("Support access request is missing expiration timestamp")]
    GrantMissingExpiration,

    /// The request's expiration timestamp is in the past
    #[error("Support access request has expired")]
    GrantExpired,

    /// An approved request is missing its digital signature
    #[error("Support access request is missing digital signature")]
    GrantMissingSignature,

    /// The digital signature is dated in the future
    #[error("Support access request has an invalid signature timestamp")]
    GrantInvalidSignatureTimestamp,

    /// A lifecycle transition was attempted from an incompatible state
    #[error("{0}")]
    InvalidTransition(String),

    /// Store or infrastructure failure, distinct from an authorization denial
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccessError {
    /// True when the error is a system failure rather than an authorization
    /// denial. Callers use this to distinguish "access denied" from "the
    /// store was unavailable".
    pub fn is_internal(&self) -> bool {
        matches!(self, AccessError::Internal(_))
    }

    /// True for expected business denials
    pub fn is_denial(&self) -> bool {
        !self.is_internal()
    }
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denials_are_not_internal() {
        assert!(AccessError::Unauthenticated.is_denial());
        assert!(AccessError::GrantExpired.is_denial());
        assert!(!AccessError::Internal("store down".to_string()).is_denial());
        assert!(AccessError::Internal("store down".to_string()).is_internal());
    }

    #[test]
    fn test_contract_messages() {
        assert_eq!(
            AccessError::Unauthenticated.to_string(),
            "Authentication required. Please sign in to access patient data."
        );
        assert_eq!(
            AccessError::UserNotFound.to_string(),
            "User not found. Please sign in with a valid account."
        );
        assert_eq!(
            AccessError::AccountInactive.to_string(),
            "Account is inactive. Please contact support."
        );
        assert!(AccessError::NoApprovedGrant
            .to_string()
            .contains("No approved support access request found"));
        assert!(AccessError::GrantPending.to_string().contains("pending approval"));
        assert!(AccessError::GrantExpired.to_string().contains("expired"));
        assert!(AccessError::GrantMissingExpiration
            .to_string()
            .contains("missing expiration timestamp"));
        assert!(AccessError::GrantMissingSignature
            .to_string()
            .contains("missing digital signature"));
        assert!(AccessError::GrantInvalidSignatureTimestamp
            .to_string()
            .contains("invalid signature timestamp"));
    }
}
