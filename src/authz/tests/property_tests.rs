//! Property-based tests for the authorization invariants

mod common;

use chrono::{Duration, Utc};
use common::{platform, seed_patient, seed_role, seed_user};
use proptest::prelude::*;
use serde_json::json;
use zenthea_authz::{
    AccessError, DigitalSignature, Patient, SupportAccessQuery, SupportAccessRequest,
    SupportAccessStore, SupportStatus, User, UserRole,
};

proptest! {
    /// Authentication is checked before any other argument is even looked at.
    #[test]
    fn prop_missing_email_is_always_unauthenticated(
        patient_id in "[a-z0-9-]{1,16}",
        tenant_id in "[a-z0-9-]{1,16}",
        path in "[a-zA-Z.]{0,32}"
    ) {
        tokio_test::block_on(async {
            let p = platform();

            let checks = [
                p.engine.resolve_identity(None).await.unwrap_err(),
                p.engine.verify_patient_access(&patient_id, None).await.unwrap_err(),
                p.engine.verify_provider_access(&patient_id, None).await.unwrap_err(),
                p.engine.verify_clinic_user_access(None, &tenant_id).await.unwrap_err(),
                p.engine.verify_owner_access(None, &tenant_id).await.unwrap_err(),
                p.engine.check_permission(None, &path).await.unwrap_err(),
            ];
            for err in checks {
                prop_assert_eq!(err, AccessError::Unauthenticated);
            }
            Ok(())
        })?;
    }

    /// Owners bypass the permission tree, whatever the tree says.
    #[test]
    fn prop_owner_override_beats_any_tree(
        section in "[a-z]{2,10}",
        feature in "[a-z]{2,10}",
        section_enabled in any::<bool>(),
        leaf in any::<bool>()
    ) {
        tokio_test::block_on(async {
            let p = platform();
            seed_role(
                &p,
                "cr-1",
                "t-1",
                json!({ section.as_str(): { "enabled": section_enabled, "features": { feature.as_str(): leaf } } }),
            )
            .await;
            seed_user(
                &p,
                User::new("u-own", "owner@clinic.test", UserRole::ClinicUser, "t-1")
                    .with_owner(true)
                    .with_custom_role("cr-1"),
            )
            .await;

            let path = format!("{section}.features.{feature}");
            let grant = p
                .engine
                .check_permission(Some("owner@clinic.test"), &path)
                .await;
            prop_assert!(grant.is_ok());
            Ok(())
        })?;
    }

    /// Users never reach patients of another tenant.
    #[test]
    fn prop_tenant_isolation(
        user_tenant in "[a-z0-9]{1,12}",
        patient_suffix in "[a-z0-9]{1,12}"
    ) {
        tokio_test::block_on(async {
            // Suffixing guarantees the tenants differ.
            let patient_tenant = format!("{user_tenant}-{patient_suffix}");

            let p = platform();
            seed_user(
                &p,
                User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, user_tenant.clone()),
            )
            .await;
            seed_patient(
                &p,
                Patient::new("pt-1", patient_tenant, "pat@home.test", "Ada", "Lovelace"),
            )
            .await;

            let patient_access = p
                .engine
                .verify_patient_access("pt-1", Some("staff@clinic.test"))
                .await;
            prop_assert!(patient_access.is_err());

            let provider_access = p
                .engine
                .verify_provider_access("pt-1", Some("staff@clinic.test"))
                .await;
            prop_assert!(provider_access.is_err());
            Ok(())
        })?;
    }

    /// A tenant-level grant and a user-level grant never satisfy each other,
    /// even for the same superadmin/tenant pair.
    #[test]
    fn prop_grant_shapes_are_exclusive(
        tenant_id in "[a-z0-9]{1,12}",
        user_id in "[a-z0-9]{1,12}",
        user_level in any::<bool>()
    ) {
        tokio_test::block_on(async {
            let p = platform();
            seed_user(&p, User::superadmin("sa-1", "support@zenthea.test")).await;

            let now = Utc::now();
            let target_user = user_level.then(|| user_id.clone());
            let mut request =
                SupportAccessRequest::new("sa-1", tenant_id.clone(), target_user, "p", now);
            request.status = SupportStatus::Approved;
            request.expiration_timestamp = Some(now + Duration::hours(1));
            request.digital_signature = Some(DigitalSignature {
                signature_data: "base64:c2lnbmVk".to_string(),
                signed_at: now,
                consent_text: "consent".to_string(),
            });
            p.support.insert_request(request).await.unwrap();

            // Query with the opposite shape.
            let query = if user_level {
                SupportAccessQuery::tenant(tenant_id.clone())
            } else {
                SupportAccessQuery::user(tenant_id.clone(), user_id.clone())
            };
            let err = p
                .engine
                .verify_support_access(Some("support@zenthea.test"), &query)
                .await
                .unwrap_err();
            prop_assert_eq!(err, AccessError::NoApprovedGrant);

            // The matching shape succeeds.
            let query = if user_level {
                SupportAccessQuery::user(tenant_id.clone(), user_id.clone())
            } else {
                SupportAccessQuery::tenant(tenant_id.clone())
            };
            let grant = p
                .engine
                .verify_support_access(Some("support@zenthea.test"), &query)
                .await;
            prop_assert!(grant.is_ok());
            Ok(())
        })?;
    }
}
