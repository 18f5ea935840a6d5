//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use zenthea_authz::{
    AccessEngine, CustomRole, InMemoryActivityStore, InMemoryCustomRoleStore,
    InMemoryPatientStore, InMemorySupportAccessStore, InMemoryUserStore, Patient,
    PermissionNode, User,
};

/// In-memory stores plus an engine wired over them
pub struct TestPlatform {
    pub users: Arc<InMemoryUserStore>,
    pub roles: Arc<InMemoryCustomRoleStore>,
    pub patients: Arc<InMemoryPatientStore>,
    pub support: Arc<InMemorySupportAccessStore>,
    pub activity: Arc<InMemoryActivityStore>,
    pub engine: AccessEngine,
}

pub fn platform() -> TestPlatform {
    let users = Arc::new(InMemoryUserStore::new());
    let roles = Arc::new(InMemoryCustomRoleStore::new());
    let patients = Arc::new(InMemoryPatientStore::new());
    let support = Arc::new(InMemorySupportAccessStore::new());
    let activity = Arc::new(InMemoryActivityStore::new());

    let engine = AccessEngine::new(
        users.clone(),
        roles.clone(),
        patients.clone(),
        support.clone(),
        activity.clone(),
    );

    TestPlatform {
        users,
        roles,
        patients,
        support,
        activity,
        engine,
    }
}

pub async fn seed_user(platform: &TestPlatform, user: User) {
    platform.users.insert(user).await;
}

pub async fn seed_patient(platform: &TestPlatform, patient: Patient) {
    platform.patients.insert(patient).await;
}

pub async fn seed_role(
    platform: &TestPlatform,
    role_id: &str,
    tenant_id: &str,
    permissions: serde_json::Value,
) {
    let permissions: std::collections::BTreeMap<String, PermissionNode> =
        serde_json::from_value(permissions).unwrap();
    platform
        .roles
        .insert(CustomRole::new(role_id, tenant_id, "test role", permissions))
        .await;
}
