//! # Permissions
//!
//! Declarative permission descriptors. A descriptor maps a resource
//! namespace and an action to a policy, and a policy is a list of grants.
//! Admins need no grant; every other role needs one that applies to it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::actions::Action;

/// A single access grant.
///
/// Grants are evaluated in declaration order by [`crate::authorize`]; the
/// first grant that admits the principal decides the outcome.
///
/// # Example
///
/// ```
/// use helpdesk_rbac::Grant;
///
/// let grant: Grant = serde_json::from_str(r#"{"grant": "user_scoped", "field": "ownerId"}"#).unwrap();
/// assert_eq!(grant, Grant::user_scoped("ownerId"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "grant", rename_all = "snake_case")]
pub enum Grant {
    /// Managers see every entity.
    Manager,

    /// Managers only see entities assigned to them through `field`.
    ManagerScoped {
        /// Field holding the assigned manager's identity.
        field: String,
    },

    /// Users see every entity (e.g. published knowledge base content).
    User,

    /// Users only see entities they own through `field`.
    UserScoped {
        /// Field holding the owner's identity.
        field: String,
    },

    /// Users act on children of a parent they own, as long as the parent is
    /// not closed. Reading, listing and creating are scoped to open parents;
    /// updating and deleting are refused.
    UserOpenParent {
        /// Parent field holding the owner's identity.
        owner_field: String,
        /// Parent field flagging it as closed.
        closed_field: String,
    },

    /// Users act only on the entity whose `field` equals their identity.
    SelfOnly {
        /// Identity field of the target entity.
        field: String,
    },
}

impl Grant {
    /// Manager scoped by `field`.
    pub fn manager_scoped(field: impl Into<String>) -> Self {
        Grant::ManagerScoped {
            field: field.into(),
        }
    }

    /// User scoped by `field`.
    pub fn user_scoped(field: impl Into<String>) -> Self {
        Grant::UserScoped {
            field: field.into(),
        }
    }

    /// User restricted to open parents they own.
    pub fn user_open_parent(owner_field: impl Into<String>, closed_field: impl Into<String>) -> Self {
        Grant::UserOpenParent {
            owner_field: owner_field.into(),
            closed_field: closed_field.into(),
        }
    }

    /// User restricted to their own entity.
    pub fn self_only(field: impl Into<String>) -> Self {
        Grant::SelfOnly {
            field: field.into(),
        }
    }
}

/// Grants declared for one resource action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPolicy {
    grants: Vec<Grant>,
}

impl AccessPolicy {
    /// Policy admitting admins only.
    pub fn admin_only() -> Self {
        Self::default()
    }

    /// Policy with the given grants.
    pub fn new(grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            grants: grants.into_iter().collect(),
        }
    }

    /// Grants in evaluation order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Check if only admins are admitted.
    pub fn is_admin_only(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Resource namespace → action → policy.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// request. A namespace/action pair that is not declared only admits admins.
///
/// # Example
///
/// ```
/// use helpdesk_rbac::{Action, Grant, PermissionDescriptor};
///
/// let descriptor = PermissionDescriptor::new()
///     .with("tickets", Action::List, [Grant::manager_scoped("managerId"), Grant::user_scoped("ownerId")])
///     .with("articles", Action::Read, [Grant::Manager, Grant::User]);
///
/// assert!(descriptor.policy("tickets", Action::List).is_some());
/// assert!(descriptor.policy("tickets", Action::Delete).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionDescriptor {
    resources: HashMap<String, HashMap<Action, AccessPolicy>>,
}

impl PermissionDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a descriptor from its JSON declaration.
    ///
    /// ```json
    /// {"tickets": {"list": [{"grant": "user_scoped", "field": "ownerId"}]}}
    /// ```
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Declare the grants of one resource action, replacing earlier ones.
    pub fn declare(
        &mut self,
        resource: impl AsRef<str>,
        action: Action,
        grants: impl IntoIterator<Item = Grant>,
    ) -> &mut Self {
        self.resources
            .entry(resource.as_ref().to_string())
            .or_default()
            .insert(action, AccessPolicy::new(grants));
        self
    }

    /// Builder form of [`PermissionDescriptor::declare`].
    pub fn with(
        mut self,
        resource: impl AsRef<str>,
        action: Action,
        grants: impl IntoIterator<Item = Grant>,
    ) -> Self {
        self.declare(resource, action, grants);
        self
    }

    /// Declare the same grants for several actions.
    pub fn with_actions(
        mut self,
        resource: impl AsRef<str>,
        actions: &[Action],
        grants: impl IntoIterator<Item = Grant>,
    ) -> Self {
        let grants: Vec<Grant> = grants.into_iter().collect();
        for action in actions {
            self.declare(resource.as_ref(), *action, grants.iter().cloned());
        }
        self
    }

    /// Policy for a resource action, if declared.
    pub fn policy(&self, resource: &str, action: Action) -> Option<&AccessPolicy> {
        self.resources.get(resource)?.get(&action)
    }

    /// Declared resource namespaces.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Check if a resource namespace is declared.
    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let descriptor = PermissionDescriptor::new()
            .with("tickets", Action::Read, [Grant::user_scoped("ownerId")])
            .with("tickets", Action::Delete, Vec::new());

        let policy = descriptor.policy("tickets", Action::Read).unwrap();
        assert_eq!(policy.grants(), &[Grant::user_scoped("ownerId")]);

        assert!(descriptor
            .policy("tickets", Action::Delete)
            .unwrap()
            .is_admin_only());
        assert!(descriptor.policy("tickets", Action::Update).is_none());
        assert!(descriptor.policy("users", Action::Read).is_none());
        assert!(descriptor.has_resource("tickets"));
    }

    #[test]
    fn test_with_actions() {
        let descriptor = PermissionDescriptor::new().with_actions(
            "articles",
            &[Action::Read, Action::List],
            [Grant::Manager, Grant::User],
        );
        assert_eq!(
            descriptor.policy("articles", Action::List).unwrap().grants().len(),
            2
        );
        assert!(descriptor.policy("articles", Action::Create).is_none());
    }

    #[test]
    fn test_from_json() {
        let descriptor = PermissionDescriptor::from_json(
            r#"{
                "comments": {
                    "create": [
                        {"grant": "manager"},
                        {"grant": "user_open_parent", "owner_field": "ownerId", "closed_field": "closed"}
                    ]
                },
                "users": {"update": [{"grant": "self_only", "field": "id"}]}
            }"#,
        )
        .unwrap();

        assert_eq!(
            descriptor.policy("comments", Action::Create).unwrap().grants(),
            &[Grant::Manager, Grant::user_open_parent("ownerId", "closed")]
        );
        assert_eq!(
            descriptor.policy("users", Action::Update).unwrap().grants(),
            &[Grant::self_only("id")]
        );
    }

    #[test]
    fn test_from_json_rejects_unknown_grant() {
        let result = PermissionDescriptor::from_json(r#"{"tickets": {"read": [{"grant": "everyone"}]}}"#);
        assert!(result.is_err());
    }
}
