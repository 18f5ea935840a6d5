//! Permission-tree evaluator integration tests

mod common;

use common::{platform, seed_role, seed_user};
use serde_json::json;
use zenthea_authz::{AccessError, User, UserRole};

fn clinic_permissions() -> serde_json::Value {
    json!({
        "patients": {
            "enabled": true,
            "viewScope": "department",
            "features": {
                "create": true,
                "list": {
                    "enabled": true,
                    "components": {
                        "patientCard": {
                            "tabs": {
                                "timeline": false,
                                "overview": true
                            }
                        }
                    }
                }
            }
        },
        "reports": { "enabled": false, "features": { "export": true } }
    })
}

#[tokio::test]
async fn test_simple_path_grant() {
    let p = platform();
    seed_role(&p, "cr-1", "t-1", clinic_permissions()).await;
    seed_user(
        &p,
        User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1").with_custom_role("cr-1"),
    )
    .await;

    let grant = p
        .engine
        .check_permission(Some("staff@clinic.test"), "patients.features.create")
        .await
        .unwrap();
    assert_eq!(grant.path, "patients.features.create");
    assert_eq!(grant.view_scope.as_deref(), Some("department"));
}

#[tokio::test]
async fn test_owner_bypasses_tree_entirely() {
    let p = platform();
    // Deny-everything role; the owner must be granted anyway.
    seed_role(&p, "cr-deny", "t-1", json!({ "patients": { "enabled": false } })).await;
    seed_user(
        &p,
        User::new("u-own", "owner@clinic.test", UserRole::ClinicUser, "t-1")
            .with_owner(true)
            .with_custom_role("cr-deny"),
    )
    .await;

    let grant = p
        .engine
        .check_permission(Some("owner@clinic.test"), "patients.features.create")
        .await
        .unwrap();
    assert_eq!(grant.path, "patients.features.create");
}

#[tokio::test]
async fn test_owner_without_custom_role_is_still_granted() {
    let p = platform();
    seed_user(
        &p,
        User::new("u-own", "owner@clinic.test", UserRole::ClinicUser, "t-1").with_owner(true),
    )
    .await;

    p.engine
        .check_permission(Some("owner@clinic.test"), "anything.at.all")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_no_custom_role_assigned() {
    let p = platform();
    seed_user(&p, User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1")).await;

    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "patients.features.create")
        .await
        .unwrap_err();
    assert_eq!(err, AccessError::NoCustomRole);
    assert_eq!(err.to_string(), "No permissions assigned to user");
}

#[tokio::test]
async fn test_empty_segment_path() {
    let p = platform();
    seed_role(&p, "cr-1", "t-1", clinic_permissions()).await;
    seed_user(
        &p,
        User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1").with_custom_role("cr-1"),
    )
    .await;

    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "patients..features.create")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("contains empty segments"));

    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Empty permission path");
}

#[tokio::test]
async fn test_deep_component_path_through_engine() {
    let p = platform();
    seed_role(&p, "cr-1", "t-1", clinic_permissions()).await;
    seed_user(
        &p,
        User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1").with_custom_role("cr-1"),
    )
    .await;

    let err = p
        .engine
        .check_permission(
            Some("staff@clinic.test"),
            "patients.features.list.components.patientCard.tabs.timeline",
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is disabled"));

    let grant = p
        .engine
        .check_permission(
            Some("staff@clinic.test"),
            "patients.features.list.components.patientCard.tabs.overview",
        )
        .await
        .unwrap();
    assert_eq!(grant.view_scope.as_deref(), Some("department"));
}

#[tokio::test]
async fn test_disabled_section_and_unknown_section() {
    let p = platform();
    seed_role(&p, "cr-1", "t-1", clinic_permissions()).await;
    seed_user(
        &p,
        User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1").with_custom_role("cr-1"),
    )
    .await;

    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "reports.features.export")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is not enabled"));

    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "scheduling.features.create")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found in permissions"));
}

#[tokio::test]
async fn test_identity_failures_propagate_verbatim() {
    let p = platform();

    let err = p
        .engine
        .check_permission(Some("ghost@clinic.test"), "patients.features.create")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "User not found. Please sign in with a valid account."
    );

    seed_user(
        &p,
        User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1").deactivated(),
    )
    .await;
    let err = p
        .engine
        .check_permission(Some("staff@clinic.test"), "patients.features.create")
        .await
        .unwrap_err();
    assert_eq!(err, AccessError::AccountInactive);
}
