//! # Resource Types
//!
//! Resource namespaces of the helpdesk backend. The access-control layer is
//! keyed by namespace strings, so other namespaces can be declared too; these
//! are the ones the default catalog knows about.

use serde::{Deserialize, Serialize};

/// Helpdesk resource namespaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Support tickets.
    Ticket,
    /// Comments posted on a ticket.
    Comment,
    /// Files attached to a ticket.
    Attachment,
    /// Knowledge base articles.
    Article,
    /// Knowledge base categories.
    Category,
    /// Uploaded files.
    Upload,
    /// User accounts.
    User,
}

impl ResourceType {
    /// Get the namespace string of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ticket => "tickets",
            ResourceType::Comment => "comments",
            ResourceType::Attachment => "attachments",
            ResourceType::Article => "articles",
            ResourceType::Category => "categories",
            ResourceType::Upload => "uploads",
            ResourceType::User => "users",
        }
    }

    /// Parse a resource type from its namespace (singular or plural).
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("tickets"), Some(ResourceType::Ticket));
    /// assert_eq!(ResourceType::parse("Ticket"), Some(ResourceType::Ticket));
    /// assert_eq!(ResourceType::parse("invoices"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ticket" | "tickets" => Some(ResourceType::Ticket),
            "comment" | "comments" => Some(ResourceType::Comment),
            "attachment" | "attachments" => Some(ResourceType::Attachment),
            "article" | "articles" => Some(ResourceType::Article),
            "category" | "categories" => Some(ResourceType::Category),
            "upload" | "uploads" => Some(ResourceType::Upload),
            "user" | "users" => Some(ResourceType::User),
            _ => None,
        }
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::Ticket,
            ResourceType::Comment,
            ResourceType::Attachment,
            ResourceType::Article,
            ResourceType::Category,
            ResourceType::Upload,
            ResourceType::User,
        ]
    }

    /// Check if entities of this type hang off a ticket.
    pub fn is_ticket_child(&self) -> bool {
        matches!(self, ResourceType::Comment | ResourceType::Attachment)
    }

    /// Check if this resource belongs to the knowledge base.
    pub fn is_knowledge_base(&self) -> bool {
        matches!(self, ResourceType::Article | ResourceType::Category)
    }
}

impl AsRef<str> for ResourceType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for resource in ResourceType::all() {
            assert_eq!(ResourceType::parse(resource.as_str()), Some(resource));
        }
    }

    #[test]
    fn test_categories() {
        assert!(ResourceType::Comment.is_ticket_child());
        assert!(ResourceType::Attachment.is_ticket_child());
        assert!(!ResourceType::Ticket.is_ticket_child());

        assert!(ResourceType::Article.is_knowledge_base());
        assert!(!ResourceType::Upload.is_knowledge_base());
    }
}
