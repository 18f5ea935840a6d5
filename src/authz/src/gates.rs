//! Role gates
//!
//! Each gate resolves the acting identity first and propagates its failures
//! verbatim, then applies one tenant/role rule. Authentication failures are
//! never masked by authorization failures. On success the resolved identity
//! is returned so callers can apply scoped-visibility rules downstream.

use crate::error::{AccessError, Result};
use crate::identity::{resolve_identity, Identity};
use crate::store::{PatientStore, UserStore};
use crate::types::UserRole;
use tracing::debug;

/// Verify access to a patient record.
///
/// A patient-role user may only reach their own record (correlated by
/// email); clinic users may reach any patient inside their own tenant.
pub async fn verify_patient_access(
    users: &dyn UserStore,
    patients: &dyn PatientStore,
    patient_id: &str,
    email: Option<&str>,
) -> Result<Identity> {
    let identity = resolve_identity(users, email).await?;

    let patient = patients
        .find_patient_by_id(patient_id)
        .await?
        .ok_or_else(|| AccessError::ResourceNotFound("Patient not found.".to_string()))?;

    let authorized = match identity.effective_role() {
        UserRole::Patient => email.is_some_and(|email| patient.email.eq_ignore_ascii_case(email)),
        UserRole::ClinicUser => identity.belongs_to(&patient.tenant_id),
        _ => false,
    };

    if authorized {
        debug!(user_id = %identity.user_id, patient_id, "patient access granted");
        Ok(identity)
    } else {
        Err(AccessError::TenantMismatch(
            "You do not have permission to access this patient record.".to_string(),
        ))
    }
}

/// Verify clinic-staff access to a patient record.
///
/// Unlike [`verify_patient_access`], a bare patient role is rejected outright.
pub async fn verify_provider_access(
    users: &dyn UserStore,
    patients: &dyn PatientStore,
    patient_id: &str,
    email: Option<&str>,
) -> Result<Identity> {
    let identity = resolve_identity(users, email).await?;

    if identity.effective_role() != UserRole::ClinicUser {
        return Err(AccessError::RoleMismatch(
            "Only clinic users can access patient records.".to_string(),
        ));
    }

    let patient = patients
        .find_patient_by_id(patient_id)
        .await?
        .ok_or_else(|| AccessError::ResourceNotFound("Patient not found.".to_string()))?;

    if !identity.belongs_to(&patient.tenant_id) {
        return Err(AccessError::TenantMismatch(
            "You cannot access patient records outside your organization.".to_string(),
        ));
    }

    debug!(user_id = %identity.user_id, patient_id, "provider access granted");
    Ok(identity)
}

/// Verify that the acting user is clinic staff of the given tenant.
pub async fn verify_clinic_user_access(
    users: &dyn UserStore,
    email: Option<&str>,
    tenant_id: &str,
) -> Result<Identity> {
    let identity = resolve_identity(users, email).await?;

    if identity.effective_role() != UserRole::ClinicUser {
        return Err(AccessError::RoleMismatch(
            "Only clinic users can perform this action.".to_string(),
        ));
    }

    if !identity.belongs_to(tenant_id) {
        return Err(AccessError::TenantMismatch(
            "You do not have access to this organization.".to_string(),
        ));
    }

    debug!(user_id = %identity.user_id, tenant_id, "clinic user access granted");
    Ok(identity)
}

/// Verify that the acting user owns the given clinic.
pub async fn verify_owner_access(
    users: &dyn UserStore,
    email: Option<&str>,
    tenant_id: &str,
) -> Result<Identity> {
    let identity = resolve_identity(users, email).await?;

    if !identity.is_owner {
        return Err(AccessError::RoleMismatch(
            "Only clinic owners can perform this action.".to_string(),
        ));
    }

    if !identity.belongs_to(tenant_id) {
        return Err(AccessError::TenantMismatch(
            "You do not have access to this organization. Owners can only access their own clinic."
                .to_string(),
        ));
    }

    debug!(user_id = %identity.user_id, tenant_id, "owner access granted");
    Ok(identity)
}
