//! # Actions
//!
//! Operations a route can perform on a resource. Route handlers map their
//! HTTP method onto one of these before asking for a decision.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// - **Read**: Fetch a single entity
/// - **List**: Query a collection
/// - **Create**: Create a new entity
/// - **Update**: Modify an existing entity
/// - **Delete**: Remove an entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Fetch a single entity.
    Read,

    /// Query a collection of entities.
    List,

    /// Create a new entity.
    Create,

    /// Modify an existing entity.
    Update,

    /// Remove an entity.
    Delete,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports blueprint aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("findOne"), Some(Action::Read));
    /// assert_eq!(Action::parse("find"), Some(Action::List));
    /// assert_eq!(Action::parse("destroy"), Some(Action::Delete));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "findone" | "show" => Some(Action::Read),
            "list" | "find" | "index" => Some(Action::List),
            "create" | "add" => Some(Action::Create),
            "update" | "edit" | "patch" => Some(Action::Update),
            "delete" | "destroy" | "remove" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Map an HTTP method to an action.
    ///
    /// `GET` is a `Read` when the route addresses a single entity and a
    /// `List` otherwise.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method name (case-insensitive)
    /// * `addresses_entity` - Whether the route carries an entity id
    pub fn from_http_method(method: &str, addresses_entity: bool) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" | "HEAD" if addresses_entity => Some(Action::Read),
            "GET" | "HEAD" => Some(Action::List),
            "POST" => Some(Action::Create),
            "PUT" | "PATCH" => Some(Action::Update),
            "DELETE" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::List,
            Action::Create,
            Action::Update,
            Action::Delete,
        ]
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::Read | Action::List)
    }

    /// Check if this action modifies an existing entity.
    ///
    /// Creation is not counted: it adds a child without touching the
    /// entities already stored.
    pub fn mutates_existing(&self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::parse("read"), Some(Action::Read));
        assert_eq!(Action::parse("findOne"), Some(Action::Read));
        assert_eq!(Action::parse("LIST"), Some(Action::List));
        assert_eq!(Action::parse("find"), Some(Action::List));
        assert_eq!(Action::parse("create"), Some(Action::Create));
        assert_eq!(Action::parse("patch"), Some(Action::Update));
        assert_eq!(Action::parse("destroy"), Some(Action::Delete));
        assert_eq!(Action::parse("approve"), None);
    }

    #[test]
    fn test_from_http_method() {
        assert_eq!(Action::from_http_method("GET", true), Some(Action::Read));
        assert_eq!(Action::from_http_method("get", false), Some(Action::List));
        assert_eq!(Action::from_http_method("POST", false), Some(Action::Create));
        assert_eq!(Action::from_http_method("PUT", true), Some(Action::Update));
        assert_eq!(Action::from_http_method("PATCH", true), Some(Action::Update));
        assert_eq!(Action::from_http_method("DELETE", true), Some(Action::Delete));
        assert_eq!(Action::from_http_method("OPTIONS", false), None);
    }

    #[test]
    fn test_action_roundtrip_str() {
        for action in Action::all() {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_read_only_and_mutating() {
        assert!(Action::Read.is_read_only());
        assert!(Action::List.is_read_only());
        assert!(!Action::Create.is_read_only());

        assert!(Action::Update.mutates_existing());
        assert!(Action::Delete.mutates_existing());
        assert!(!Action::Create.mutates_existing());
        assert!(!Action::Read.mutates_existing());
    }
}
