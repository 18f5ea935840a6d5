//! Fire-and-forget activity logging
//!
//! Calendar and clinical edits are logged through the same append-only
//! contract as the support-access audit trail, but as a side channel: a
//! failed write is logged and swallowed, never surfaced to the caller. The
//! primary operation's outcome must not depend on the log.

use crate::store::ActivityStore;
use crate::types::{TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// One activity log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Tenant the activity belongs to
    pub tenant_id: TenantId,

    /// Acting user, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// What happened (e.g. "updated", "deleted")
    pub action: String,

    /// Resource kind (e.g. "appointment", "patient_note")
    pub resource: String,

    /// Resource identifier
    pub resource_id: String,

    /// Free-form context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Server-assigned timestamp
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a record stamped with the given server time
    pub fn new(
        tenant_id: impl Into<TenantId>,
        action: impl Into<String>,
        resource: impl Into<String>,
        resource_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: None,
            action: action.into(),
            resource: resource.into(),
            resource_id: resource_id.into(),
            details: None,
            timestamp,
        }
    }

    /// Attach the acting user
    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach free-form details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Failure-tolerant writer over an [`ActivityStore`]
pub struct ActivityLogger {
    store: Arc<dyn ActivityStore>,
}

impl ActivityLogger {
    /// Create a logger backed by the given store
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Record an activity. Never fails: persistence errors are logged at
    /// warn level and swallowed.
    pub async fn record(&self, record: ActivityRecord) {
        let resource = record.resource.clone();
        let resource_id = record.resource_id.clone();
        if let Err(err) = self.store.record_activity(record).await {
            warn!(%err, %resource, %resource_id, "activity log write failed; continuing");
        }
    }
}
