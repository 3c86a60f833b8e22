//! Default helpdesk catalog
//!
//! Access rules and expandable relations of the built-in resources. Both are
//! plain values built once at startup and shared through `Arc`.
//!
//! | Resource    | Managers                 | Users                                  |
//! |-------------|--------------------------|----------------------------------------|
//! | tickets     | assigned (`managerId`)   | owned (`ownerId`)                      |
//! | comments    | all                      | on their open tickets, no edit/delete  |
//! | attachments | all                      | on their open tickets, no edit/delete  |
//! | uploads     | all                      | owned (`ownerId`), no delete           |
//! | articles    | all                      | read only                              |
//! | categories  | all                      | read only                              |
//! | users       | read                     | themselves only                        |
//!
//! Comment and attachment rules filter on the child document itself, so
//! every comment and attachment must carry a copy of its ticket's `ownerId`
//! and `closed` fields. Documents without them are invisible to users.

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use helpdesk_expand::{ExpansionMap, MapError};
use helpdesk_rbac::{Action, Grant, PermissionDescriptor, ResourceType};

const READ: [Action; 2] = [Action::Read, Action::List];
const READ_CREATE: [Action; 3] = [Action::Read, Action::List, Action::Create];
const MODIFY: [Action; 2] = [Action::Update, Action::Delete];
const WRITE: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

/// Access rules and expansion maps of a set of resources.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptor: Arc<PermissionDescriptor>,
    expansions: HashMap<String, Arc<ExpansionMap>>,
}

impl Catalog {
    /// Create a catalog from a descriptor; no resource is expandable yet.
    pub fn new(descriptor: PermissionDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            expansions: HashMap::new(),
        }
    }

    /// Register the expansion map of a resource.
    pub fn with_expansions(mut self, resource: impl AsRef<str>, map: ExpansionMap) -> Self {
        self.expansions
            .insert(resource.as_ref().to_string(), Arc::new(map));
        self
    }

    /// The built-in helpdesk resources.
    ///
    /// # Errors
    ///
    /// [`MapError`] if a declared route template is malformed.
    pub fn helpdesk() -> Result<Self, MapError> {
        let mut catalog = Self::new(helpdesk_descriptor());
        for (resource, map) in helpdesk_expansions()? {
            catalog = catalog.with_expansions(resource, map);
        }
        Ok(catalog)
    }

    /// Shared permission descriptor.
    pub fn descriptor(&self) -> Arc<PermissionDescriptor> {
        Arc::clone(&self.descriptor)
    }

    /// Expansion map of a resource; empty when none is registered.
    pub fn expansions(&self, resource: &str) -> Arc<ExpansionMap> {
        self.expansions
            .get(resource)
            .cloned()
            .unwrap_or_else(|| Arc::new(ExpansionMap::empty()))
    }
}

/// Access rules of the built-in resources.
///
/// Ticket children are scoped through the ticket fields copied onto them
/// (`ownerId`, `closed`); keep those copies in sync when a ticket changes
/// hands or is closed.
pub fn helpdesk_descriptor() -> PermissionDescriptor {
    let ticket_child = [Grant::Manager, Grant::user_open_parent("ownerId", "closed")];

    PermissionDescriptor::new()
        // Tickets; delete stays admin-only
        .with_actions(
            ResourceType::Ticket,
            &[Action::Read, Action::List, Action::Update],
            [Grant::manager_scoped("managerId"), Grant::user_scoped("ownerId")],
        )
        .with(ResourceType::Ticket, Action::Create, [Grant::Manager, Grant::User])
        // Ticket children
        .with_actions(ResourceType::Comment, &READ_CREATE, ticket_child.clone())
        .with_actions(ResourceType::Comment, &MODIFY, ticket_child.clone())
        .with_actions(ResourceType::Attachment, &READ_CREATE, ticket_child.clone())
        .with_actions(ResourceType::Attachment, &MODIFY, ticket_child)
        // Uploads
        .with_actions(
            ResourceType::Upload,
            &[Action::Read, Action::List, Action::Create, Action::Update],
            [Grant::Manager, Grant::user_scoped("ownerId")],
        )
        .with(ResourceType::Upload, Action::Delete, [Grant::Manager])
        // Knowledge base
        .with_actions(ResourceType::Article, &READ, [Grant::Manager, Grant::User])
        .with_actions(ResourceType::Article, &WRITE, [Grant::Manager])
        .with_actions(ResourceType::Category, &READ, [Grant::Manager, Grant::User])
        .with_actions(ResourceType::Category, &WRITE, [Grant::Manager])
        // Users
        .with(ResourceType::User, Action::Read, [Grant::Manager, Grant::self_only("id")])
        .with(ResourceType::User, Action::List, [Grant::Manager])
        .with(ResourceType::User, Action::Update, [Grant::self_only("id")])
}

/// Expandable relations of the built-in resources.
///
/// # Errors
///
/// [`MapError`] if a declared route template is malformed.
pub fn helpdesk_expansions() -> Result<Vec<(ResourceType, ExpansionMap)>, MapError> {
    Ok(vec![
        (
            ResourceType::Ticket,
            ExpansionMap::from_value(json!({
                "owner": {"route": "/users/{ownerId}"},
                "manager": {"route": "/users/{managerId}"},
                "category": {"route": "/categories/{categoryId}"},
                "comments": {
                    "route": "/tickets/{id}/comments",
                    "expands": {
                        "author": {"route": "/users/{authorId}"},
                        "attachments": {
                            "route": "/comments/{id}/attachments",
                            "expands": {"upload": {"route": "/uploads/{uploadId}"}}
                        }
                    }
                },
                "attachments": {
                    "route": "/tickets/{id}/attachments",
                    "expands": {"upload": {"route": "/uploads/{uploadId}"}}
                }
            }))?,
        ),
        (
            ResourceType::Comment,
            ExpansionMap::from_value(json!({
                "ticket": {"route": "/tickets/{ticketId}"},
                "author": {"route": "/users/{authorId}"},
                "attachments": {
                    "route": "/comments/{id}/attachments",
                    "expands": {"upload": {"route": "/uploads/{uploadId}"}}
                }
            }))?,
        ),
        (
            ResourceType::Attachment,
            ExpansionMap::from_value(json!({
                "upload": {"route": "/uploads/{uploadId}"},
                "comment": {"route": "/comments/{commentId}"}
            }))?,
        ),
        (
            ResourceType::Upload,
            ExpansionMap::from_value(json!({
                "owner": {"route": "/users/{ownerId}"}
            }))?,
        ),
        (
            ResourceType::Article,
            ExpansionMap::from_value(json!({
                "author": {"route": "/users/{authorId}"},
                "category": {"route": "/categories/{categoryId}"}
            }))?,
        ),
        (
            ResourceType::Category,
            ExpansionMap::from_value(json!({
                "articles": {
                    "route": "/categories/{id}/articles",
                    "expands": {"author": {"route": "/users/{authorId}"}}
                }
            }))?,
        ),
        (
            ResourceType::User,
            ExpansionMap::from_value(json!({
                "avatar": {"route": "/uploads/{avatarId}"}
            }))?,
        ),
    ])
}
