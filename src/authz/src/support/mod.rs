//! Break-glass support access
//!
//! Superadmins have no tenant binding, so any access to tenant data is
//! elevated access: it must be requested, approved with consent and an
//! expiration, and every use recorded. [`SupportAccessService`] drives the
//! request lifecycle and verifies grants at use time.
//!
//! Verification is two-phase: the decision is computed from pure reads
//! against a single sampled `now`, and only then is the `accessed` audit
//! entry appended. An audit write failure is logged and swallowed; it never
//! changes the decision.

pub mod types;


pub use types::{
    AuditAction, AuditEntry, DigitalSignature, SupportAccessRequest, SupportStatus,
};

use crate::error::{AccessError, Result};
use crate::identity::Identity;
use crate::store::SupportAccessStore;
use crate::types::{TenantId, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Grant shape and client metadata for a verification call
#[derive(Debug, Clone, PartialEq)]
pub struct SupportAccessQuery {
    /// Tenant whose data is being accessed
    pub target_tenant_id: TenantId,

    /// Present for a user-level query; absent for a tenant-level query.
    /// Matching against stored requests is strict: the shapes never satisfy
    /// each other.
    pub target_user_id: Option<UserId>,

    /// Client IP for the audit entry
    pub ip_address: Option<String>,

    /// Client user agent for the audit entry
    pub user_agent: Option<String>,
}

impl SupportAccessQuery {
    /// Tenant-level query
    pub fn tenant(target_tenant_id: impl Into<TenantId>) -> Self {
        Self {
            target_tenant_id: target_tenant_id.into(),
            target_user_id: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// User-level query
    pub fn user(target_tenant_id: impl Into<TenantId>, target_user_id: impl Into<UserId>) -> Self {
        Self {
            target_tenant_id: target_tenant_id.into(),
            target_user_id: Some(target_user_id.into()),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach client transport metadata
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// Whether a verification may persist its `accessed` audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Append the `accessed` audit entry on success
    Recorded,
    /// Pure read; never mutates, still returns the full decision
    ReadOnly,
}

/// A verified, currently-usable grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportAccessGrant {
    /// The request backing the grant
    pub request_id: String,

    /// Hard end of the grant window
    pub expires_at: DateTime<Utc>,
}

/// Drives the support-access request lifecycle
pub struct SupportAccessService {
    store: Arc<dyn SupportAccessStore>,
}

impl SupportAccessService {
    /// Create a service over the given store
    pub fn new(store: Arc<dyn SupportAccessStore>) -> Self {
        Self { store }
    }

    /// Create a pending request on behalf of a superadmin.
    pub async fn request_access(
        &self,
        actor: &Identity,
        target_tenant_id: impl Into<TenantId>,
        target_user_id: Option<UserId>,
        purpose: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<SupportAccessRequest> {
        require_superadmin(actor)?;

        let request = SupportAccessRequest::new(
            actor.user_id.clone(),
            target_tenant_id,
            target_user_id,
            purpose,
            now,
        );
        self.store.insert_request(request.clone()).await?;

        info!(
            request_id = %request.id,
            tenant_id = %request.target_tenant_id,
            "support access requested"
        );
        Ok(request)
    }

    /// Approve a pending request with an expiration and consent signature.
    pub async fn approve(
        &self,
        actor: &Identity,
        request_id: &str,
        expiration: DateTime<Utc>,
        signature: DigitalSignature,
        now: DateTime<Utc>,
    ) -> Result<SupportAccessRequest> {
        require_superadmin(actor)?;

        let mut request = self.load(request_id).await?;
        request.approve(actor.user_id.clone(), expiration, signature, now)?;
        self.store.update_request(request.clone()).await?;

        info!(request_id, expires_at = %expiration, "support access approved");
        Ok(request)
    }

    /// Deny a pending request (terminal).
    pub async fn deny(
        &self,
        actor: &Identity,
        request_id: &str,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SupportAccessRequest> {
        require_superadmin(actor)?;

        let mut request = self.load(request_id).await?;
        request.deny(actor.user_id.clone(), details, now)?;
        self.store.update_request(request.clone()).await?;

        info!(request_id, "support access denied");
        Ok(request)
    }

    /// Revoke an approved or accessed grant (terminal).
    pub async fn revoke(
        &self,
        actor: &Identity,
        request_id: &str,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SupportAccessRequest> {
        require_superadmin(actor)?;

        let mut request = self.load(request_id).await?;
        request.revoke(actor.user_id.clone(), details, now)?;
        self.store.update_request(request.clone()).await?;

        info!(request_id, "support access revoked");
        Ok(request)
    }

    /// Verify that the actor holds a usable grant for the queried shape.
    ///
    /// Check order is a contract: superadmin role, matching request, pending
    /// status, expiration presence, expiration window, signature presence,
    /// signature timestamp. Expiration is judged against `now`, never
    /// against the stored status.
    pub async fn verify(
        &self,
        actor: &Identity,
        query: &SupportAccessQuery,
        mode: VerifyMode,
        now: DateTime<Utc>,
    ) -> Result<SupportAccessGrant> {
        require_superadmin(actor)?;

        debug!(
            superadmin_id = %actor.user_id,
            tenant_id = %query.target_tenant_id,
            user_level = query.target_user_id.is_some(),
            "verifying support access"
        );

        let request = self
            .store
            .find_matching_request(
                &actor.user_id,
                &query.target_tenant_id,
                query.target_user_id.as_deref(),
            )
            .await?
            .ok_or(AccessError::NoApprovedGrant)?;

        if request.status == SupportStatus::Pending {
            return Err(AccessError::GrantPending);
        }
        if !request.status.is_usable() {
            return Err(AccessError::NoApprovedGrant);
        }

        let Some(expires_at) = request.expiration_timestamp else {
            return Err(AccessError::GrantMissingExpiration);
        };
        if expires_at <= now {
            if mode == VerifyMode::Recorded {
                self.record_expiry(&request, actor, now).await;
            }
            return Err(AccessError::GrantExpired);
        }

        let Some(signature) = &request.digital_signature else {
            return Err(AccessError::GrantMissingSignature);
        };
        if signature.signed_at > now {
            return Err(AccessError::GrantInvalidSignatureTimestamp);
        }

        // Decision is made; the audit append below must not change it.
        if mode == VerifyMode::Recorded {
            let entry = AuditEntry::new(AuditAction::Accessed, actor.user_id.clone(), now)
                .with_client(query.ip_address.clone(), query.user_agent.clone());
            if let Err(err) = self.store.append_audit_entry(&request.id, entry).await {
                warn!(%err, request_id = %request.id, "accessed audit append failed; continuing");
            } else if let Err(err) = self
                .store
                .update_status(&request.id, SupportStatus::Accessed)
                .await
            {
                warn!(%err, request_id = %request.id, "status update failed; continuing");
            }
        }

        info!(
            request_id = %request.id,
            superadmin_id = %actor.user_id,
            tenant_id = %query.target_tenant_id,
            %expires_at,
            "support access granted"
        );

        Ok(SupportAccessGrant {
            request_id: request.id,
            expires_at,
        })
    }

    /// Converge stored state with an observed expiration. Best-effort: the
    /// caller's denial stands whether or not this write lands.
    async fn record_expiry(&self, request: &SupportAccessRequest, actor: &Identity, now: DateTime<Utc>) {
        let entry = AuditEntry::new(AuditAction::Expired, actor.user_id.clone(), now);
        if let Err(err) = self.store.append_audit_entry(&request.id, entry).await {
            warn!(%err, request_id = %request.id, "expired audit append failed; continuing");
            return;
        }
        if let Err(err) = self
            .store
            .update_status(&request.id, SupportStatus::Expired)
            .await
        {
            warn!(%err, request_id = %request.id, "status update failed; continuing");
        }
    }

    async fn load(&self, request_id: &str) -> Result<SupportAccessRequest> {
        self.store
            .find_request_by_id(request_id)
            .await?
            .ok_or_else(|| {
                AccessError::ResourceNotFound("Support access request not found.".to_string())
            })
    }
}

fn require_superadmin(actor: &Identity) -> Result<()> {
    if actor.effective_role() == UserRole::SuperAdmin {
        Ok(())
    } else {
        Err(AccessError::RoleMismatch(
            "Only superadmins can perform support access.".to_string(),
        ))
    }
}
