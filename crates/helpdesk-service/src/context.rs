//! Per-request context
//!
//! A [`RequestContext`] carries everything one request owns: the principal,
//! the parsed query parameters, the filter set access control and callers
//! compose into, deferred caller filters and the cancellation token threaded
//! through expansion. It is never shared between requests.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use helpdesk_expand::ExpansionRequest;
use helpdesk_query::{FilterSet, MergeStrategy, PageDefaults, PendingFilters, QueryParams};
use helpdesk_rbac::{Principal, PrincipalResolver};

use crate::error::ApiResult;

/// State of one in-flight request.
///
/// # Examples
///
/// ```
/// use helpdesk_query::{PageDefaults, QueryParams};
/// use helpdesk_rbac::Principal;
/// use helpdesk_service::RequestContext;
///
/// let params = QueryParams::from_pairs([("status", "open")], PageDefaults::default()).unwrap();
/// let ctx = RequestContext::new(Some(Principal::user("u-1")), params);
///
/// assert_eq!(ctx.filters().get("status"), Some(&serde_json::json!("open")));
/// assert!(!ctx.cancel_token().is_cancelled());
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Correlation id for logs
    pub correlation_id: Uuid,

    principal: Option<Principal>,
    params: QueryParams,
    filters: FilterSet,
    pending: PendingFilters,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Create a context; caller filters from `params` seed the filter set.
    pub fn new(principal: Option<Principal>, params: QueryParams) -> Self {
        let filters = params.filters.clone();
        Self {
            correlation_id: Uuid::now_v7(),
            principal,
            params,
            filters,
            pending: PendingFilters::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Parse raw query pairs into a context.
    ///
    /// # Errors
    ///
    /// [`crate::ApiError::Validation`] for malformed `page` or `limit`.
    pub fn from_query<I, K, V>(
        principal: Option<Principal>,
        pairs: I,
        defaults: PageDefaults,
    ) -> ApiResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = QueryParams::from_pairs(pairs, defaults)?;
        Ok(Self::new(principal, params))
    }

    /// Resolve the principal from a credential, then build the context.
    ///
    /// An unknown or absent credential yields an anonymous context; access
    /// control decides whether that is acceptable.
    pub async fn authenticate(
        resolver: &dyn PrincipalResolver,
        credential: Option<&str>,
        params: QueryParams,
    ) -> ApiResult<Self> {
        let principal = resolver.resolve(credential).await?;
        Ok(Self::new(principal, params))
    }

    /// Add route-declared filters that may still be deferred.
    pub fn with_pending(mut self, pending: PendingFilters) -> Self {
        self.pending = pending;
        self
    }

    /// Tie the request to an outer cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Principal of the request, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Parsed query parameters.
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Filter set composed so far.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Mutable filter set, for access-control scopes.
    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Merge filters into the request's filter set.
    pub fn merge_filters(&mut self, filters: &FilterSet, strategy: MergeStrategy) {
        self.filters.merge(filters, strategy);
    }

    /// Resolve deferred filters and add those not already constrained.
    ///
    /// # Errors
    ///
    /// [`crate::ApiError::Validation`] when a resolver fails.
    pub async fn resolve_pending(&mut self) -> ApiResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let resolved = self.pending.resolve().await?;
        self.filters.merge(&resolved, MergeStrategy::KeepExisting);
        Ok(())
    }

    /// Expansion paths requested with `expand`.
    pub fn expansion_request(&self) -> ExpansionRequest {
        self.params.expand.iter().collect()
    }

    /// Token cancelled when the request is abandoned.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Abandon the request.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
