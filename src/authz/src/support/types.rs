//! Break-glass support-access entities and lifecycle transitions
//!
//! A [`SupportAccessRequest`] is the unit of elevated access: a superadmin
//! asks for time-boxed entry into one tenant (or one user within a tenant),
//! an approver signs off with consent metadata, and every transition lands in
//! an append-only audit trail. Transitions are pure methods taking the
//! caller-sampled `now`, so one timestamp governs a whole evaluation.

use crate::error::{AccessError, Result};
use crate::types::{TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of a support-access request
///
/// `Pending → Approved | Denied`; `Approved → Accessed* → Expired | Revoked`.
/// `Denied`, `Expired` and `Revoked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    Pending,
    Approved,
    Denied,
    Accessed,
    Expired,
    Revoked,
}

impl SupportStatus {
    /// True for states that admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SupportStatus::Denied | SupportStatus::Expired | SupportStatus::Revoked
        )
    }

    /// True when the grant window may still be open (expiration permitting)
    pub fn is_usable(self) -> bool {
        matches!(self, SupportStatus::Approved | SupportStatus::Accessed)
    }
}

impl fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupportStatus::Pending => "pending",
            SupportStatus::Approved => "approved",
            SupportStatus::Denied => "denied",
            SupportStatus::Accessed => "accessed",
            SupportStatus::Expired => "expired",
            SupportStatus::Revoked => "revoked",
        };
        f.write_str(name)
    }
}

/// Audit trail action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Requested,
    Approved,
    Denied,
    Accessed,
    Expired,
    Revoked,
}

/// Consent signature captured at approval time
///
/// This is consent metadata, not a cryptographic verification: the engine
/// checks presence and that `signed_at` is not in the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalSignature {
    /// Opaque signature payload supplied by the approval UI
    pub signature_data: String,

    /// When the consent was signed
    pub signed_at: DateTime<Utc>,

    /// The consent text the approver agreed to
    pub consent_text: String,
}

/// One immutable entry in a request's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// What happened
    pub action: AuditAction,

    /// Server-assigned timestamp, never client-supplied
    pub timestamp: DateTime<Utc>,

    /// Acting user
    pub user_id: UserId,

    /// Client IP, when the transport supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Client user agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Free-form context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the given server time
    pub fn new(action: AuditAction, user_id: impl Into<UserId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            timestamp,
            user_id: user_id.into(),
            ip_address: None,
            user_agent: None,
            details: None,
        }
    }

    /// Attach client transport metadata
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Attach free-form details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A superadmin's request for break-glass access to a tenant or user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportAccessRequest {
    /// Request identifier
    pub id: String,

    /// Requesting superadmin
    pub superadmin_id: UserId,

    /// Tenant whose data the grant covers
    pub target_tenant_id: TenantId,

    /// Present for a user-level grant; absent for a tenant-level grant.
    /// The two shapes never satisfy each other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<UserId>,

    /// Stated purpose, shown to the approver and kept for compliance review
    pub purpose: String,

    /// Current lifecycle status
    pub status: SupportStatus,

    /// Hard end of the grant window; required once approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<DateTime<Utc>>,

    /// Consent signature; required once approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<DigitalSignature>,

    /// Who approved the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,

    /// Append-only history; never truncated or rewritten
    #[serde(default)]
    pub audit_trail: Vec<AuditEntry>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl SupportAccessRequest {
    /// Create a pending request with its initial `requested` audit entry
    pub fn new(
        superadmin_id: impl Into<UserId>,
        target_tenant_id: impl Into<TenantId>,
        target_user_id: Option<UserId>,
        purpose: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let superadmin_id = superadmin_id.into();
        Self {
            id: Uuid::new_v4().to_string(),
            superadmin_id: superadmin_id.clone(),
            target_tenant_id: target_tenant_id.into(),
            target_user_id,
            purpose: purpose.into(),
            status: SupportStatus::Pending,
            expiration_timestamp: None,
            digital_signature: None,
            approved_by: None,
            audit_trail: vec![AuditEntry::new(AuditAction::Requested, superadmin_id, now)],
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the grant window has closed, judged by comparison against
    /// `now` rather than by the stored status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_timestamp
            .is_some_and(|expiration| expiration <= now)
    }

    /// Append an audit entry. Prior entries are never reordered or removed.
    pub fn append_audit(&mut self, entry: AuditEntry) {
        self.updated_at = entry.timestamp;
        self.audit_trail.push(entry);
    }

    /// Approve a pending request.
    ///
    /// Approval must carry both an expiration in the future and a consent
    /// signature dated no later than `now`.
    pub fn approve(
        &mut self,
        approved_by: impl Into<UserId>,
        expiration: DateTime<Utc>,
        signature: DigitalSignature,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_status(SupportStatus::Pending, SupportStatus::Approved)?;
        if expiration <= now {
            return Err(AccessError::GrantExpired);
        }
        if signature.signed_at > now {
            return Err(AccessError::GrantInvalidSignatureTimestamp);
        }

        let approved_by = approved_by.into();
        self.status = SupportStatus::Approved;
        self.expiration_timestamp = Some(expiration);
        self.digital_signature = Some(signature);
        self.approved_by = Some(approved_by.clone());
        self.append_audit(AuditEntry::new(AuditAction::Approved, approved_by, now));
        Ok(())
    }

    /// Deny a pending request (terminal)
    pub fn deny(
        &mut self,
        denied_by: impl Into<UserId>,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_status(SupportStatus::Pending, SupportStatus::Denied)?;
        self.status = SupportStatus::Denied;
        let mut entry = AuditEntry::new(AuditAction::Denied, denied_by, now);
        entry.details = details;
        self.append_audit(entry);
        Ok(())
    }

    /// Revoke an approved or accessed grant (terminal)
    pub fn revoke(
        &mut self,
        revoked_by: impl Into<UserId>,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.status.is_usable() {
            return Err(AccessError::InvalidTransition(format!(
                "Support access request cannot move from {} to revoked",
                self.status
            )));
        }
        self.status = SupportStatus::Revoked;
        let mut entry = AuditEntry::new(AuditAction::Revoked, revoked_by, now);
        entry.details = details;
        self.append_audit(entry);
        Ok(())
    }

    fn require_status(&self, expected: SupportStatus, target: SupportStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(AccessError::InvalidTransition(format!(
                "Support access request cannot move from {} to {}",
                self.status, target
            )))
        }
    }
}
