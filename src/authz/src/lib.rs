//! # Zenthea Authorization Engine
//!
//! Multi-tenant authorization core for the Zenthea healthcare platform.
//!
//! ## Features
//!
//! - **Identity resolution** with a strict failure ladder (unauthenticated →
//!   unknown user → inactive account) that is never masked by later checks
//! - **Role gates** for patient, provider, clinic-user, and owner access
//!   with tenant isolation on every check
//! - **Custom-role permission trees** — nested, tenant-authored capability
//!   trees resolved by dotted path, with an owner override and view scopes
//! - **Break-glass support access** — consent-gated, time-boxed superadmin
//!   access with an append-only audit trail
//! - **Async store boundary** — the engine performs no I/O of its own;
//!   persistence is injected behind `async` traits
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zenthea_authz::{
//!     AccessEngine, InMemoryActivityStore, InMemoryCustomRoleStore, InMemoryPatientStore,
//!     InMemorySupportAccessStore, InMemoryUserStore, User, UserRole,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = Arc::new(InMemoryUserStore::new());
//!     users
//!         .insert(User::new("u-1", "staff@clinic.test", UserRole::ClinicUser, "t-1"))
//!         .await;
//!
//!     let engine = AccessEngine::new(
//!         users,
//!         Arc::new(InMemoryCustomRoleStore::new()),
//!         Arc::new(InMemoryPatientStore::new()),
//!         Arc::new(InMemorySupportAccessStore::new()),
//!         Arc::new(InMemoryActivityStore::new()),
//!     );
//!
//!     let identity = engine
//!         .verify_clinic_user_access(Some("staff@clinic.test"), "t-1")
//!         .await?;
//!     assert!(!identity.is_owner);
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod engine;
pub mod error;
pub mod gates;
pub mod identity;
pub mod permissions;
pub mod store;
pub mod support;
pub mod types;

// Re-export commonly used types
pub use audit::{ActivityLogger, ActivityRecord};
pub use engine::AccessEngine;
pub use error::{AccessError, Result};
pub use identity::Identity;
pub use permissions::{PermissionGrant, PermissionGroup, PermissionNode};
pub use store::{
    ActivityStore, CustomRoleStore, InMemoryActivityStore, InMemoryCustomRoleStore,
    InMemoryPatientStore, InMemorySupportAccessStore, InMemoryUserStore, PatientStore,
    SupportAccessStore, UserStore,
};
pub use support::{
    AuditAction, AuditEntry, DigitalSignature, SupportAccessGrant, SupportAccessQuery,
    SupportAccessRequest, SupportAccessService, SupportStatus, VerifyMode,
};
pub use types::{CustomRole, Patient, PatientId, RoleId, TenantId, User, UserId, UserRole};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
