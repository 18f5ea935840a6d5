//! Access engine
//!
//! Orchestrates identity resolution, role gates, permission tree evaluation,
//! and the support-access workflow over the injected stores.
//!
//! ```text
//! Request → IdentityResolver → RoleGate | PermissionTree | SupportAccess → Decision
//!                                                              ↓
//!                                                        [Audit Trail]
//! ```
//!
//! All entry points are short-lived, request-scoped computations. Each one
//! samples `now` once and threads it through every timestamp comparison, so
//! the expiration check and the signature-timestamp check can never disagree
//! about the current time.

use crate::audit::{ActivityLogger, ActivityRecord};
use crate::error::{AccessError, Result};
use crate::gates;
use crate::identity::{self, Identity};
use crate::permissions::{self, PermissionGrant};
use crate::store::{
    ActivityStore, CustomRoleStore, PatientStore, SupportAccessStore, UserStore,
};
use crate::support::{
    DigitalSignature, SupportAccessGrant, SupportAccessQuery, SupportAccessRequest,
    SupportAccessService, VerifyMode,
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Main access-control engine
pub struct AccessEngine {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn CustomRoleStore>,
    patients: Arc<dyn PatientStore>,
    support: SupportAccessService,
    activity: ActivityLogger,
}

impl AccessEngine {
    /// Create an engine over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn CustomRoleStore>,
        patients: Arc<dyn PatientStore>,
        support_requests: Arc<dyn SupportAccessStore>,
        activity: Arc<dyn ActivityStore>,
    ) -> Self {
        Self {
            users,
            roles,
            patients,
            support: SupportAccessService::new(support_requests),
            activity: ActivityLogger::new(activity),
        }
    }

    /// Resolve the acting user's authentication state. Pure read.
    pub async fn resolve_identity(&self, email: Option<&str>) -> Result<Identity> {
        identity::resolve_identity(self.users.as_ref(), email).await
    }

    /// Verify access to a patient record (patient self-access or same-tenant
    /// clinic staff).
    pub async fn verify_patient_access(
        &self,
        patient_id: &str,
        email: Option<&str>,
    ) -> Result<Identity> {
        gates::verify_patient_access(
            self.users.as_ref(),
            self.patients.as_ref(),
            patient_id,
            email,
        )
        .await
    }

    /// Verify clinic-staff access to a patient record.
    pub async fn verify_provider_access(
        &self,
        patient_id: &str,
        email: Option<&str>,
    ) -> Result<Identity> {
        gates::verify_provider_access(
            self.users.as_ref(),
            self.patients.as_ref(),
            patient_id,
            email,
        )
        .await
    }

    /// Verify that the acting user is clinic staff of the given tenant.
    pub async fn verify_clinic_user_access(
        &self,
        email: Option<&str>,
        tenant_id: &str,
    ) -> Result<Identity> {
        gates::verify_clinic_user_access(self.users.as_ref(), email, tenant_id).await
    }

    /// Verify that the acting user owns the given clinic.
    pub async fn verify_owner_access(
        &self,
        email: Option<&str>,
        tenant_id: &str,
    ) -> Result<Identity> {
        gates::verify_owner_access(self.users.as_ref(), email, tenant_id).await
    }

    /// Check a dotted capability path against the acting user's custom role.
    ///
    /// Owners bypass the tree entirely; the override runs before path
    /// validation and before any role lookup. The evaluator is pure and
    /// never mutates the role tree.
    pub async fn check_permission(
        &self,
        email: Option<&str>,
        path: &str,
    ) -> Result<PermissionGrant> {
        let identity = self.resolve_identity(email).await?;

        if identity.is_owner {
            debug!(user_id = %identity.user_id, path, "owner override");
            return Ok(PermissionGrant {
                path: path.to_string(),
                view_scope: None,
            });
        }

        let role_id = identity
            .custom_role_id
            .as_deref()
            .ok_or(AccessError::NoCustomRole)?;

        let role = self
            .roles
            .find_custom_role_by_id(role_id)
            .await?
            .ok_or(AccessError::NoCustomRole)?;

        permissions::evaluate_path(&role.permissions, path)
    }

    /// Create a pending support-access request.
    pub async fn request_support_access(
        &self,
        email: Option<&str>,
        target_tenant_id: &str,
        target_user_id: Option<UserId>,
        purpose: &str,
    ) -> Result<SupportAccessRequest> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support
            .request_access(&actor, target_tenant_id, target_user_id, purpose, now)
            .await
    }

    /// Approve a pending support-access request.
    pub async fn approve_support_access(
        &self,
        email: Option<&str>,
        request_id: &str,
        expiration: DateTime<Utc>,
        signature: DigitalSignature,
    ) -> Result<SupportAccessRequest> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support
            .approve(&actor, request_id, expiration, signature, now)
            .await
    }

    /// Deny a pending support-access request.
    pub async fn deny_support_access(
        &self,
        email: Option<&str>,
        request_id: &str,
        details: Option<String>,
    ) -> Result<SupportAccessRequest> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support.deny(&actor, request_id, details, now).await
    }

    /// Revoke an approved or accessed grant.
    pub async fn revoke_support_access(
        &self,
        email: Option<&str>,
        request_id: &str,
        details: Option<String>,
    ) -> Result<SupportAccessRequest> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support.revoke(&actor, request_id, details, now).await
    }

    /// Verify a usable grant and record the access in the audit trail.
    pub async fn verify_support_access(
        &self,
        email: Option<&str>,
        query: &SupportAccessQuery,
    ) -> Result<SupportAccessGrant> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support
            .verify(&actor, query, VerifyMode::Recorded, now)
            .await
    }

    /// Verify a usable grant without mutating anything. For read-only query
    /// contexts that cannot persist the `accessed` entry.
    pub async fn verify_support_access_read_only(
        &self,
        email: Option<&str>,
        query: &SupportAccessQuery,
    ) -> Result<SupportAccessGrant> {
        let now = Utc::now();
        let actor = self.resolve_identity(email).await?;
        self.support
            .verify(&actor, query, VerifyMode::ReadOnly, now)
            .await
    }

    /// Record a clinical/calendar activity. Fire-and-forget: a persistence
    /// failure is logged and swallowed.
    pub async fn log_activity(&self, record: ActivityRecord) {
        self.activity.record(record).await;
    }
}
