//! Capability fetching related entities.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::FetchResult;

/// Source of related entities.
///
/// Implementations should return promptly once `cancel` fires; the resolver
/// drops the future either way.
#[async_trait]
pub trait RelatedFetcher: Send + Sync {
    /// Fetch the entity (or list of entities) at a rendered route.
    ///
    /// # Arguments
    ///
    /// * `route` - Route rendered for the parent entity
    /// * `parent_id` - Identifier of the parent entity
    /// * `cancel` - Token of the owning expansion
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing exists at the route.
    async fn fetch_related(
        &self,
        route: &str,
        parent_id: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Value>>;
}

#[async_trait]
impl<F: RelatedFetcher + ?Sized> RelatedFetcher for Arc<F> {
    async fn fetch_related(
        &self,
        route: &str,
        parent_id: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Value>> {
        (**self).fetch_related(route, parent_id, cancel).await
    }
}
