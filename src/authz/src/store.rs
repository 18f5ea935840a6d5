//! Store traits at the persistence boundary, with in-memory implementations
//!
//! The engine performs no I/O of its own; everything it reads or writes goes
//! through these traits. The in-memory implementations back the test suite
//! and lightweight embedders.

use crate::audit::ActivityRecord;
use crate::error::{AccessError, Result};
use crate::support::{AuditEntry, SupportAccessRequest, SupportStatus};
use crate::types::{CustomRole, Patient, PatientId, RoleId, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// User lookup
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by id
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}

/// Custom role lookup
#[async_trait]
pub trait CustomRoleStore: Send + Sync {
    /// Find a custom role by id
    async fn find_custom_role_by_id(&self, id: &str) -> Result<Option<CustomRole>>;
}

/// Patient lookup
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Find a patient by id
    async fn find_patient_by_id(&self, id: &str) -> Result<Option<Patient>>;
}

/// Support-access request persistence
#[async_trait]
pub trait SupportAccessStore: Send + Sync {
    /// Most recent request matching the grant shape exactly. A tenant-level
    /// grant (no target user) never matches a user-level query and vice
    /// versa. Only pending and usable (approved/accessed) requests are
    /// returned; terminal requests never match.
    async fn find_matching_request(
        &self,
        superadmin_id: &str,
        target_tenant_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<Option<SupportAccessRequest>>;

    /// Find a request by id
    async fn find_request_by_id(&self, id: &str) -> Result<Option<SupportAccessRequest>>;

    /// Persist a new request
    async fn insert_request(&self, request: SupportAccessRequest) -> Result<()>;

    /// Replace a request after a lifecycle transition
    async fn update_request(&self, request: SupportAccessRequest) -> Result<()>;

    /// Append one audit entry. Implementations must make the append atomic
    /// (or serialize appends per request id) so concurrent entries are never
    /// dropped.
    async fn append_audit_entry(&self, request_id: &str, entry: AuditEntry) -> Result<()>;

    /// Update only the status field
    async fn update_status(&self, request_id: &str, status: SupportStatus) -> Result<()>;
}

/// Activity log persistence
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Persist one activity record
    async fn record_activity(&self, record: ActivityRecord) -> Result<()>;
}

/// In-memory user store
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub async fn insert(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }
}

/// In-memory custom role store
#[derive(Default)]
pub struct InMemoryCustomRoleStore {
    roles: Arc<RwLock<HashMap<RoleId, CustomRole>>>,
}

impl InMemoryCustomRoleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role
    pub async fn insert(&self, role: CustomRole) {
        let mut roles = self.roles.write().await;
        roles.insert(role.id.clone(), role);
    }
}

#[async_trait]
impl CustomRoleStore for InMemoryCustomRoleStore {
    async fn find_custom_role_by_id(&self, id: &str) -> Result<Option<CustomRole>> {
        let roles = self.roles.read().await;
        Ok(roles.get(id).cloned())
    }
}

/// In-memory patient store
#[derive(Default)]
pub struct InMemoryPatientStore {
    patients: Arc<RwLock<HashMap<PatientId, Patient>>>,
}

impl InMemoryPatientStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a patient
    pub async fn insert(&self, patient: Patient) {
        let mut patients = self.patients.write().await;
        patients.insert(patient.id.clone(), patient);
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn find_patient_by_id(&self, id: &str) -> Result<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients.get(id).cloned())
    }
}

/// In-memory support-access request store
///
/// Audit appends hold the write lock for the whole read-modify-write, which
/// serializes appends per store and satisfies the atomic-append contract.
#[derive(Default)]
pub struct InMemorySupportAccessStore {
    requests: Arc<RwLock<HashMap<String, SupportAccessRequest>>>,
}

impl InMemorySupportAccessStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupportAccessStore for InMemorySupportAccessStore {
    async fn find_matching_request(
        &self,
        superadmin_id: &str,
        target_tenant_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<Option<SupportAccessRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .filter(|request| {
                request.superadmin_id == superadmin_id
                    && request.target_tenant_id == target_tenant_id
                    && request.target_user_id.as_deref() == target_user_id
                    && (request.status == SupportStatus::Pending || request.status.is_usable())
            })
            .max_by_key(|request| request.created_at)
            .cloned())
    }

    async fn find_request_by_id(&self, id: &str) -> Result<Option<SupportAccessRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(id).cloned())
    }

    async fn insert_request(&self, request: SupportAccessRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id.clone(), request);
        Ok(())
    }

    async fn update_request(&self, request: SupportAccessRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id) {
            return Err(AccessError::Internal(format!(
                "support access request not found: {}",
                request.id
            )));
        }
        requests.insert(request.id.clone(), request);
        Ok(())
    }

    async fn append_audit_entry(&self, request_id: &str, entry: AuditEntry) -> Result<()> {
        let mut requests = self.requests.write().await;
        let request = requests.get_mut(request_id).ok_or_else(|| {
            AccessError::Internal(format!("support access request not found: {request_id}"))
        })?;
        request.append_audit(entry);
        Ok(())
    }

    async fn update_status(&self, request_id: &str, status: SupportStatus) -> Result<()> {
        let mut requests = self.requests.write().await;
        let request = requests.get_mut(request_id).ok_or_else(|| {
            AccessError::Internal(format!("support access request not found: {request_id}"))
        })?;
        request.status = status;
        Ok(())
    }
}

/// In-memory activity store
#[derive(Default)]
pub struct InMemoryActivityStore {
    records: Arc<RwLock<Vec<ActivityRecord>>>,
}

impl InMemoryActivityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded activity, in append order
    pub async fn records(&self) -> Vec<ActivityRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn record_activity(&self, record: ActivityRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }
}
