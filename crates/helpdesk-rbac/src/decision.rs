//! # Decisions
//!
//! The single dispatcher that evaluates a permission descriptor against the
//! principal of a request. Allowed requests may come with scope filters that
//! must be merged into the request's filter set with override semantics
//! before the query runs.

use helpdesk_query::{FilterSet, MergeStrategy};
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::error::{AccessError, AccessResult};
use crate::permissions::{Grant, PermissionDescriptor};
use crate::principal::{Principal, Role};

/// What a request wants to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// Resource namespace.
    pub resource: String,
    /// Requested action.
    pub action: Action,
    /// Identity of the addressed entity, for identity-bound actions.
    pub target: Option<String>,
}

impl AccessRequest {
    /// Request on a resource collection or an unidentified entity.
    pub fn new(resource: impl AsRef<str>, action: Action) -> Self {
        Self {
            resource: resource.as_ref().to_string(),
            action,
            target: None,
        }
    }

    /// Address a specific entity.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No principal.
    Unauthenticated,
    /// Role or ownership check failed.
    Forbidden,
}

impl From<DenyReason> for AccessError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AccessError::Unauthenticated,
            DenyReason::Forbidden => AccessError::Forbidden,
        }
    }
}

/// Outcome of an authorization.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Allowed without restriction.
    Allow,
    /// Allowed, restricted to entities matching the filters.
    AllowScoped(FilterSet),
    /// Denied.
    Deny(DenyReason),
}

impl Decision {
    /// Check if the request may proceed.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Deny(_))
    }

    /// Scope filters of an allowed request.
    pub fn scope(&self) -> Option<&FilterSet> {
        match self {
            Decision::AllowScoped(filters) => Some(filters),
            _ => None,
        }
    }

    /// Apply the decision to a request's filter set.
    ///
    /// Scope filters are merged with [`MergeStrategy::Override`] so that a
    /// caller-supplied filter of the same name cannot widen the scope.
    /// Denials leave the filters untouched and turn into an [`AccessError`].
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::FilterSet;
    /// use helpdesk_rbac::Decision;
    ///
    /// let mut filters = FilterSet::single("ownerId", "someone-else");
    /// Decision::AllowScoped(FilterSet::single("ownerId", "u-1"))
    ///     .apply_to(&mut filters)
    ///     .unwrap();
    /// assert_eq!(filters.get("ownerId"), Some(&serde_json::json!("u-1")));
    /// ```
    pub fn apply_to(&self, filters: &mut FilterSet) -> AccessResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::AllowScoped(scope) => {
                filters.merge(scope, MergeStrategy::Override);
                Ok(())
            }
            Decision::Deny(reason) => Err((*reason).into()),
        }
    }
}

/// Evaluate `descriptor` for `principal` and `request`.
///
/// 1. No principal: denied as unauthenticated.
/// 2. Admins: allowed, never scoped.
/// 3. Unknown roles: forbidden.
/// 4. Managers and users: the first grant of the declared policy that
///    admits the principal decides; an undeclared action or no admitting
///    grant is forbidden.
pub fn authorize(
    descriptor: &PermissionDescriptor,
    principal: Option<&Principal>,
    request: &AccessRequest,
) -> Decision {
    let decision = evaluate(descriptor, principal, request);

    let role = principal.map(|p| p.role.as_str()).unwrap_or("ANONYMOUS");
    match &decision {
        Decision::Deny(reason) => tracing::info!(
            resource = %request.resource,
            action = %request.action,
            role = role,
            reason = ?reason,
            "Access denied"
        ),
        allowed => tracing::debug!(
            resource = %request.resource,
            action = %request.action,
            role = role,
            scoped = allowed.scope().is_some(),
            "Access granted"
        ),
    }

    decision
}

impl PermissionDescriptor {
    /// Method form of [`authorize`].
    pub fn authorize(&self, principal: Option<&Principal>, request: &AccessRequest) -> Decision {
        authorize(self, principal, request)
    }
}

fn evaluate(
    descriptor: &PermissionDescriptor,
    principal: Option<&Principal>,
    request: &AccessRequest,
) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    match principal.role {
        Role::Admin => return Decision::Allow,
        Role::Unknown => return Decision::Deny(DenyReason::Forbidden),
        Role::Manager | Role::User => {}
    }

    let Some(policy) = descriptor.policy(&request.resource, request.action) else {
        return Decision::Deny(DenyReason::Forbidden);
    };

    policy
        .grants()
        .iter()
        .find_map(|grant| evaluate_grant(grant, principal, request))
        .unwrap_or(Decision::Deny(DenyReason::Forbidden))
}

fn evaluate_grant(grant: &Grant, principal: &Principal, request: &AccessRequest) -> Option<Decision> {
    let identity = principal.identity.as_str();

    match (principal.role, grant) {
        (Role::Manager, Grant::Manager) | (Role::User, Grant::User) => Some(Decision::Allow),

        (Role::Manager, Grant::ManagerScoped { field }) | (Role::User, Grant::UserScoped { field }) => {
            Some(Decision::AllowScoped(FilterSet::single(field.as_str(), identity)))
        }

        (
            Role::User,
            Grant::UserOpenParent {
                owner_field,
                closed_field,
            },
        ) => {
            if request.action.mutates_existing() {
                return None;
            }
            Some(Decision::AllowScoped(
                FilterSet::new()
                    .with(owner_field.as_str(), identity)
                    .with(closed_field.as_str(), false),
            ))
        }

        (Role::User, Grant::SelfOnly { field }) => match request.target.as_deref() {
            Some(target) if target == identity => {
                Some(Decision::AllowScoped(FilterSet::single(field.as_str(), identity)))
            }
            _ => None,
        },

        _ => None,
    }
}
