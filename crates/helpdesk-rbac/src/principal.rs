//! The authenticated actor of a request and the capability that supplies it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AccessResult;

/// Role of a principal.
///
/// Any role string other than the three known ones deserializes to
/// [`Role::Unknown`], which is always denied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, never scoped.
    Admin,
    /// Handles tickets assigned to them.
    Manager,
    /// End user owning their tickets.
    User,
    /// Unrecognized role.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a role string (case-insensitive); unrecognized strings yield
    /// [`Role::Unknown`].
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_rbac::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Role::Admin);
    /// assert_eq!(Role::parse("MANAGER"), Role::Manager);
    /// assert_eq!(Role::parse("superuser"), Role::Unknown);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "user" => Role::User,
            _ => Role::Unknown,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
            Role::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor making a request. Immutable for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque identity.
    pub identity: String,
    /// Role of the actor.
    pub role: Role,
}

impl Principal {
    /// Create a principal.
    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    /// Shorthand for an admin principal.
    pub fn admin(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Admin)
    }

    /// Shorthand for a manager principal.
    pub fn manager(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Manager)
    }

    /// Shorthand for a user principal.
    pub fn user(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::User)
    }

    /// Check if the principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Supplies the principal of the current request.
///
/// Token validation lives in the HTTP layer; implementations only map the
/// credential presented with a request to a principal.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolve a credential. `Ok(None)` means unauthenticated.
    async fn resolve(&self, credential: Option<&str>) -> AccessResult<Option<Principal>>;
}

/// Resolver backed by a fixed credential table.
#[derive(Debug, Clone, Default)]
pub struct StaticPrincipalResolver {
    principals: HashMap<String, Principal>,
}

impl StaticPrincipalResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential.
    pub fn with(mut self, credential: impl Into<String>, principal: Principal) -> Self {
        self.principals.insert(credential.into(), principal);
        self
    }
}

#[async_trait]
impl PrincipalResolver for StaticPrincipalResolver {
    async fn resolve(&self, credential: Option<&str>) -> AccessResult<Option<Principal>> {
        Ok(credential.and_then(|c| self.principals.get(c).cloned()))
    }
}
