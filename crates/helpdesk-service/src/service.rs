//! # Resource pipeline
//!
//! The read path every helpdesk resource shares:
//!
//! ```text
//! authorize ─► scope filters (override) ─► deferred filters (keep existing)
//!           ─► repository find ─► expand relations ─► {data, meta}
//! ```
//!
//! A denial stops the request before the repository is touched. Scope
//! filters always win over caller filters of the same name, so a caller can
//! narrow a listing but never widen it.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use helpdesk_expand::{Expander, ExpansionMap, RelatedFetcher};
use helpdesk_query::{FilterSet, MergeStrategy, Pagination, ResponseMetadata};
use helpdesk_rbac::{AccessRequest, Action, PermissionDescriptor, ResourceType};

use crate::catalog::Catalog;
use crate::config::ServiceConfig;
use crate::context::RequestContext;
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::repository::{FindQuery, Repository};

/// Read operations of one resource.
#[derive(Clone)]
pub struct ResourceService {
    resource: String,
    descriptor: Arc<PermissionDescriptor>,
    expansions: Arc<ExpansionMap>,
    repository: Arc<dyn Repository>,
    fetcher: Arc<dyn RelatedFetcher>,
    config: Arc<ServiceConfig>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl ResourceService {
    /// Create a service for one resource namespace.
    pub fn new(
        resource: impl Into<String>,
        descriptor: Arc<PermissionDescriptor>,
        expansions: Arc<ExpansionMap>,
        repository: Arc<dyn Repository>,
        fetcher: Arc<dyn RelatedFetcher>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            resource: resource.into(),
            descriptor,
            expansions,
            repository,
            fetcher,
            config,
        }
    }

    /// Create a service for a catalog resource.
    pub fn from_catalog(
        catalog: &Catalog,
        resource: ResourceType,
        repository: Arc<dyn Repository>,
        fetcher: Arc<dyn RelatedFetcher>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self::new(
            resource.as_str(),
            catalog.descriptor(),
            catalog.expansions(resource.as_str()),
            repository,
            fetcher,
            config,
        )
    }

    /// Resource namespace served.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// List the entities visible to the request's principal.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthenticated`] / [`ApiError::Forbidden`] on denial
    /// - [`ApiError::Validation`] when a deferred filter fails
    /// - [`ApiError::Repository`] when the repository fails
    #[instrument(
        skip(self, ctx),
        fields(resource = %self.resource, correlation_id = %ctx.correlation_id)
    )]
    pub async fn list(&self, ctx: &mut RequestContext) -> ApiResult<Envelope<Vec<Value>>> {
        self.authorize(ctx, AccessRequest::new(&self.resource, Action::List))?;
        ctx.resolve_pending().await?;

        let params = ctx.params();
        let query = FindQuery {
            filters: ctx.filters().clone(),
            sort: params.sort.clone(),
            page: params.page,
            limit: params.limit,
        };
        let found = self.repository.find(&self.resource, &query).await?;
        debug!(
            item_count = found.item_count,
            returned = found.items.len(),
            "Listed entities"
        );

        let items = self
            .expander()
            .expand_all(
                found.items,
                &ctx.expansion_request(),
                ctx.cancel_token(),
                self.config.list_expand_concurrency,
            )
            .await;

        let pagination = Pagination::new(
            found.item_count,
            query.page,
            query.limit,
            Some(query.sort),
        );
        let meta = ResponseMetadata::build(
            self.config.entity_url(&self.resource, None),
            Some(&pagination),
        );

        Ok(Envelope::new(items, meta))
    }

    /// Fetch one entity visible to the request's principal.
    ///
    /// An entity outside the principal's scope is reported exactly like a
    /// missing one.
    ///
    /// # Errors
    ///
    /// As [`ResourceService::list`], plus [`ApiError::NotFound`].
    #[instrument(
        skip(self, ctx),
        fields(resource = %self.resource, correlation_id = %ctx.correlation_id)
    )]
    pub async fn get(&self, ctx: &mut RequestContext, id: &str) -> ApiResult<Envelope<Value>> {
        let id_field = self.config.expand.id_field.as_str();
        ctx.merge_filters(&FilterSet::single(id_field, id), MergeStrategy::Override);

        self.authorize(
            ctx,
            AccessRequest::new(&self.resource, Action::Read).with_target(id),
        )?;
        ctx.resolve_pending().await?;

        let query = FindQuery {
            filters: ctx.filters().clone(),
            sort: ctx.params().sort.clone(),
            page: 1,
            limit: 1,
        };
        let entity = self
            .repository
            .find(&self.resource, &query)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                resource: self.resource.clone(),
                id: id.to_string(),
            })?;

        let entity = self
            .expander()
            .expand(entity, &ctx.expansion_request(), ctx.cancel_token())
            .await;
        let meta = ResponseMetadata::build(self.config.entity_url(&self.resource, Some(id)), None);

        Ok(Envelope::new(entity, meta))
    }

    fn authorize(&self, ctx: &mut RequestContext, request: AccessRequest) -> ApiResult<()> {
        let decision = self.descriptor.authorize(ctx.principal(), &request);
        decision.apply_to(ctx.filters_mut())?;
        Ok(())
    }

    fn expander(&self) -> Expander<'_> {
        Expander::new(&self.expansions, self.fetcher.as_ref(), &self.config.expand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use async_trait::async_trait;
    use helpdesk_expand::FetchResult;
    use helpdesk_query::QueryParams;
    use helpdesk_rbac::Principal;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    struct NoRelations;

    #[async_trait]
    impl RelatedFetcher for NoRelations {
        async fn fetch_related(
            &self,
            _route: &str,
            _parent_id: &str,
            _cancel: &CancellationToken,
        ) -> FetchResult<Option<Value>> {
            Ok(None)
        }
    }

    async fn tickets() -> ResourceService {
        let repository = MemoryRepository::new();
        repository
            .extend(
                "tickets",
                vec![
                    json!({"id": "t-1", "ownerId": "u-1", "managerId": "m-1"}),
                    json!({"id": "t-2", "ownerId": "u-2", "managerId": "m-1"}),
                    json!({"id": "t-3", "ownerId": "u-1", "managerId": "m-2"}),
                ],
            )
            .await;

        ResourceService::from_catalog(
            &Catalog::helpdesk().unwrap(),
            ResourceType::Ticket,
            Arc::new(repository),
            Arc::new(NoRelations),
            Arc::new(ServiceConfig::default()),
        )
    }

    fn ctx(principal: Option<Principal>, pairs: &[(&str, &str)]) -> RequestContext {
        let params = QueryParams::from_pairs(pairs.iter().copied(), Default::default()).unwrap();
        RequestContext::new(principal, params)
    }

    fn ids(items: &[Value]) -> Vec<&str> {
        items.iter().filter_map(|t| t["id"].as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_scoped_to_owner() {
        let service = tickets().await;
        let mut ctx = ctx(Some(Principal::user("u-1")), &[("ownerId", "u-2")]);

        let envelope = service.list(&mut ctx).await.unwrap();

        assert_eq!(ids(&envelope.data), vec!["t-1", "t-3"]);
        assert_eq!(ctx.filters().get("ownerId"), Some(&json!("u-1")));
        let paginator = envelope.meta.paginator.unwrap();
        assert_eq!(paginator.total_entries, 2);
        assert_eq!(paginator.total_pages, 1);
    }

    #[tokio::test]
    async fn test_list_denied_without_principal() {
        let service = tickets().await;
        let err = service.list(&mut ctx(None, &[])).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_get_out_of_scope_is_not_found() {
        let service = tickets().await;
        let mut ctx = ctx(Some(Principal::manager("m-2")), &[]);

        let err = service.get(&mut ctx, "t-1").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(!err.to_string().contains("managerId"));
    }

    #[tokio::test]
    async fn test_get_visible_entity() {
        let service = tickets().await;
        let mut ctx = ctx(Some(Principal::admin("a-1")), &[]);

        let envelope = service.get(&mut ctx, "t-2").await.unwrap();
        assert_eq!(envelope.data["ownerId"], "u-2");
        assert_eq!(envelope.meta.url, "http://localhost:1337/tickets/t-2");
        assert!(envelope.meta.paginator.is_none());
    }
}
