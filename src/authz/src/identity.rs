//! Identity resolution
//!
//! Every protected operation starts here. The failure ladder is a contract:
//! unauthenticated → unknown user → inactive account, in that order, before
//! any role or tenant rule runs. Optional fields on the stored user have
//! already been defaulted at the serde boundary, so the resolved identity
//! always carries concrete values.

use crate::error::{AccessError, Result};
use crate::store::UserStore;
use crate::types::{RoleId, TenantId, UserId, UserRole};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resolved authentication state for an acting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User identifier
    pub user_id: UserId,

    /// Role as stored, legacy aliases included
    pub role: UserRole,

    /// Tenant binding; `None` only for superadmins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    /// Clinic owner flag, defaulted to false when unset on the record
    pub is_owner: bool,

    /// Department memberships, defaulted to empty when unset
    pub departments: Vec<String>,

    /// Assigned custom role, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_role_id: Option<RoleId>,
}

impl Identity {
    /// Role used by every access check. Legacy `admin`/`provider` map to
    /// `clinic_user`; this accessor is the only place the aliasing lives.
    pub fn effective_role(&self) -> UserRole {
        self.role.effective()
    }

    /// True when the identity belongs to the given tenant
    pub fn belongs_to(&self, tenant_id: &str) -> bool {
        self.tenant_id.as_deref() == Some(tenant_id)
    }
}

/// Resolve the acting user's authentication state from an optional email.
pub(crate) async fn resolve_identity(
    users: &dyn UserStore,
    email: Option<&str>,
) -> Result<Identity> {
    let Some(email) = email else {
        return Err(AccessError::Unauthenticated);
    };

    let user = users
        .find_user_by_email(email)
        .await?
        .ok_or(AccessError::UserNotFound)?;

    if !user.is_active {
        return Err(AccessError::AccountInactive);
    }

    debug!(user_id = %user.id, role = ?user.role, "identity resolved");

    Ok(Identity {
        user_id: user.id,
        role: user.role,
        tenant_id: user.tenant_id,
        is_owner: user.is_owner,
        departments: user.departments,
        custom_role_id: user.custom_role_id,
    })
}
