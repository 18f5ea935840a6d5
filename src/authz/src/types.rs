//! Core identity and tenant types
//!
//! These mirror the shapes the platform's document store persists, so the
//! serde field names stay camelCase. Optional owner/department fields default
//! at this boundary; nothing downstream sees a missing value.

use crate::permissions::PermissionNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique user identifier
pub type UserId = String;

/// Unique tenant (clinic/organization) identifier
pub type TenantId = String;

/// Unique patient identifier
pub type PatientId = String;

/// Unique custom-role identifier
pub type RoleId = String;

/// Platform role assigned to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Legacy alias for `ClinicUser`
    Admin,
    /// Legacy alias for `ClinicUser`
    Provider,
    /// Clinic staff member
    ClinicUser,
    /// Clinical subject with access to their own records
    Patient,
    /// Demo account
    Demo,
    /// Platform superadmin with no tenant binding
    SuperAdmin,
}

impl UserRole {
    /// Normalized role used by every access check. `admin` and `provider`
    /// are legacy aliases kept for backward-compatible routing; all
    /// authorization logic compares against the effective role only.
    pub fn effective(self) -> UserRole {
        match self {
            UserRole::Admin | UserRole::Provider => UserRole::ClinicUser,
            other => other,
        }
    }

    /// True when the effective role is `ClinicUser`
    pub fn is_clinic_user(self) -> bool {
        self.effective() == UserRole::ClinicUser
    }
}

/// An authenticable principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub id: UserId,

    /// Email, unique within a tenant context
    pub email: String,

    /// Assigned role
    pub role: UserRole,

    /// Tenant binding; `None` only for superadmins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    /// Deactivation flag; inactive users fail identity resolution
    pub is_active: bool,

    /// Clinic owner flag
    #[serde(default)]
    pub is_owner: bool,

    /// Department memberships
    #[serde(default)]
    pub departments: Vec<String>,

    /// Reference to a tenant-defined custom role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_role_id: Option<RoleId>,
}

impl User {
    /// Create an active user bound to a tenant
    pub fn new(
        id: impl Into<UserId>,
        email: impl Into<String>,
        role: UserRole,
        tenant_id: impl Into<TenantId>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            tenant_id: Some(tenant_id.into()),
            is_active: true,
            is_owner: false,
            departments: Vec::new(),
            custom_role_id: None,
        }
    }

    /// Create an active superadmin (no tenant binding)
    pub fn superadmin(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: UserRole::SuperAdmin,
            tenant_id: None,
            is_active: true,
            is_owner: false,
            departments: Vec::new(),
            custom_role_id: None,
        }
    }

    /// Mark the user as a clinic owner
    pub fn with_owner(mut self, is_owner: bool) -> Self {
        self.is_owner = is_owner;
        self
    }

    /// Set department memberships
    pub fn with_departments(mut self, departments: Vec<String>) -> Self {
        self.departments = departments;
        self
    }

    /// Assign a custom role
    pub fn with_custom_role(mut self, role_id: impl Into<RoleId>) -> Self {
        self.custom_role_id = Some(role_id.into());
        self
    }

    /// Deactivate the user
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A tenant-scoped custom role holding a nested permission tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRole {
    /// Role identifier
    pub id: RoleId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Display name
    pub name: String,

    /// Template roles are cloned by tenant admins, never assigned directly
    #[serde(default)]
    pub is_template: bool,

    /// Section name → permission subtree
    pub permissions: BTreeMap<String, PermissionNode>,
}

impl CustomRole {
    /// Create a custom role with the given permission tree
    pub fn new(
        id: impl Into<RoleId>,
        tenant_id: impl Into<TenantId>,
        name: impl Into<String>,
        permissions: BTreeMap<String, PermissionNode>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            is_template: false,
            permissions,
        }
    }
}

/// A clinical subject scoped to a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Patient identifier
    pub id: PatientId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Contact email, used to correlate a patient-role login with their record
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,
}

impl Patient {
    /// Create a patient record
    pub fn new(
        id: impl Into<PatientId>,
        tenant_id: impl Into<TenantId>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}
