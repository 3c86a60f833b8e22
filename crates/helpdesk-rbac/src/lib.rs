//! # Helpdesk RBAC
//!
//! Role-scoped access control shared by every helpdesk resource.
//!
//! ## Overview
//!
//! The helpdesk-rbac crate handles:
//! - **Principals**: The authenticated actor (identity + role)
//! - **Actions**: Operations routes perform on resources
//! - **Grants**: Tagged access rules (scoped or unscoped, per role)
//! - **Descriptors**: Resource namespace → action → grants, built at startup
//! - **Decisions**: Allow, allow with scope filters, or deny
//!
//! ## Decision flow
//!
//! ```text
//! no principal            → Deny(Unauthenticated)
//! ADMIN                   → Allow
//! MANAGER / USER          → first admitting grant of the declared policy
//!   ManagerScoped(f)      → AllowScoped({f: identity})
//!   UserScoped(f)         → AllowScoped({f: identity})
//!   UserOpenParent(o, c)  → AllowScoped({o: identity, c: false}) for read/list/create
//!   SelfOnly(f)           → AllowScoped({f: identity}) when the target is the principal
//!   Manager / User        → Allow
//!   nothing admits        → Deny(Forbidden)
//! unknown role            → Deny(Forbidden)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use helpdesk_query::FilterSet;
//! use helpdesk_rbac::{authorize, AccessRequest, Action, Grant, PermissionDescriptor, Principal};
//!
//! let descriptor = PermissionDescriptor::new().with(
//!     "tickets",
//!     Action::List,
//!     [Grant::manager_scoped("managerId"), Grant::user_scoped("ownerId")],
//! );
//!
//! let user = Principal::user("u-1");
//! let decision = authorize(&descriptor, Some(&user), &AccessRequest::new("tickets", Action::List));
//!
//! let mut filters = FilterSet::single("ownerId", "u-2");
//! decision.apply_to(&mut filters).unwrap();
//! assert_eq!(filters.get("ownerId"), Some(&serde_json::json!("u-1")));
//! ```

pub mod actions;
pub mod decision;
pub mod error;
pub mod permissions;
pub mod principal;
pub mod resources;

// Re-export main types for convenience
pub use actions::Action;
pub use decision::{authorize, AccessRequest, Decision, DenyReason};
pub use error::{AccessError, AccessResult};
pub use permissions::{AccessPolicy, Grant, PermissionDescriptor};
pub use principal::{Principal, PrincipalResolver, Role, StaticPrincipalResolver};
pub use resources::ResourceType;
