//! # Response expansion
//!
//! Augments entities with the related entities a client asked for.
//!
//! ```text
//! expand=owner,comments.author
//!
//!              ┌── owner ──────────────► /users/{ownerId}
//!   ticket ────┤
//!              └── comments ───────────► /tickets/{id}/comments
//!                     └── author ──────► /users/{authorId}   (per comment)
//! ```
//!
//! Top-level relations are fetched concurrently. Along one path the parent
//! is fetched before its children, and children of one parent run
//! concurrently, at most [`ExpandConfig::fan_out`] array elements at a time.
//! Everything is bounded by [`ExpandConfig::deadline`] and by the caller's
//! [`CancellationToken`]: relations that have not finished by then are
//! dropped and omitted, finished ones are kept even when their own nested
//! relations are still in flight.
//!
//! Expansion never fails. Unknown paths, missing relations and failing
//! fetches only leave their key out of the response.

use futures::future::{join_all, BoxFuture};
use futures::stream::{self, FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ExpandConfig;
use crate::error::FetchError;
use crate::fetcher::RelatedFetcher;
use crate::map::{ExpansionMap, ExpansionNode};
use crate::request::{ExpansionRequest, PathTree};
use crate::route::scalar_to_string;

/// Expands entities against one expansion map.
#[derive(Clone, Copy)]
pub struct Expander<'a> {
    map: &'a ExpansionMap,
    fetcher: &'a dyn RelatedFetcher,
    config: &'a ExpandConfig,
}

impl<'a> Expander<'a> {
    /// Create an expander.
    pub fn new(
        map: &'a ExpansionMap,
        fetcher: &'a dyn RelatedFetcher,
        config: &'a ExpandConfig,
    ) -> Self {
        Self {
            map,
            fetcher,
            config,
        }
    }

    /// Deepest path this expander will follow.
    pub fn max_depth(&self) -> usize {
        self.config.max_depth.min(self.map.depth())
    }

    /// Expand one entity.
    ///
    /// # Arguments
    ///
    /// * `root` - Entity to augment; non-objects are returned unchanged
    /// * `request` - Requested relation paths
    /// * `cancel` - Token of the owning request
    ///
    /// # Returns
    ///
    /// `root` with each fetched relation under its requested key.
    pub async fn expand(
        &self,
        root: Value,
        request: &ExpansionRequest,
        cancel: &CancellationToken,
    ) -> Value {
        if request.is_empty() {
            return root;
        }
        let plan = request.plan(self.map, self.max_depth());
        let deadline = Instant::now() + self.config.deadline();
        self.expand_until(root, &plan, cancel, deadline).await
    }

    /// Expand a page of entities, at most `concurrency` at a time.
    ///
    /// Order is preserved and the whole page shares one deadline.
    pub async fn expand_all(
        &self,
        items: Vec<Value>,
        request: &ExpansionRequest,
        cancel: &CancellationToken,
        concurrency: usize,
    ) -> Vec<Value> {
        if request.is_empty() || items.is_empty() {
            return items;
        }
        let plan = request.plan(self.map, self.max_depth());
        if plan.is_empty() {
            return items;
        }
        let deadline = Instant::now() + self.config.deadline();

        stream::iter(items)
            .map(|item| self.expand_until(item, &plan, cancel, deadline))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn expand_until(
        &self,
        mut root: Value,
        plan: &PathTree,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Value {
        if plan.is_empty() || !root.is_object() {
            return root;
        }

        let token = cancel.child_token();
        let mut slots: Vec<Option<Value>> = vec![None; plan.children.len()];

        {
            let parent = &root;
            let mut pending = FuturesUnordered::new();
            for (idx, (name, subtree)) in plan.children.iter().enumerate() {
                if let Some(node) = self.map.nodes().get(name) {
                    let branch = self.fetch_branch(node, subtree, parent, name.clone(), &token);
                    pending.push(async move { (idx, branch.await) });
                }
            }

            let expired = sleep_until(deadline);
            tokio::pin!(expired);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(unfinished = pending.len(), "Expansion cancelled");
                        break;
                    }
                    _ = &mut expired => {
                        warn!(
                            unfinished = pending.len(),
                            deadline_ms = self.config.deadline_ms,
                            "Expansion deadline exceeded, omitting unfinished relations"
                        );
                        token.cancel();
                        break;
                    }
                    next = pending.next() => match next {
                        Some((idx, value)) => slots[idx] = value,
                        None => break,
                    },
                }
            }

            // Branches see the cancelled token at their next await and settle
            // with whatever they already fetched.
            while let Some((idx, value)) = pending.next().await {
                slots[idx] = value;
            }
        }

        if let Value::Object(fields) = &mut root {
            for (name, slot) in plan.children.keys().zip(slots) {
                if let Some(value) = slot {
                    fields.insert(name.clone(), value);
                }
            }
        }
        root
    }

    fn fetch_branch<'f>(
        &'f self,
        node: &'f ExpansionNode,
        subtree: &'f PathTree,
        parent: &'f Value,
        path: String,
        token: &'f CancellationToken,
    ) -> BoxFuture<'f, Option<Value>> {
        async move {
            let id_field = self.config.id_field.as_str();
            let Some(route) = node.route.render(parent, id_field) else {
                debug!(path = %path, route = %node.route, "Parent lacks fields for route");
                return None;
            };
            let parent_id = parent
                .get(id_field)
                .and_then(scalar_to_string)
                .unwrap_or_default();

            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                result = self.fetcher.fetch_related(&route, &parent_id, token) => result,
            };

            let mut value = match fetched {
                Ok(Some(value)) => value,
                Ok(None) => {
                    debug!(path = %path, route = %route, "Related entity not found");
                    return None;
                }
                Err(FetchError::Cancelled) => return None,
                Err(e) => {
                    warn!(path = %path, route = %route, error = %e, "Failed to expand relation");
                    return None;
                }
            };

            if !subtree.is_empty() {
                self.expand_children(&mut value, node, subtree, &path, token)
                    .await;
            }
            Some(value)
        }
        .boxed()
    }

    async fn expand_children(
        &self,
        value: &mut Value,
        node: &ExpansionNode,
        subtree: &PathTree,
        path: &str,
        token: &CancellationToken,
    ) {
        if let Value::Array(items) = value {
            let attaches: Vec<_> = items
                .iter_mut()
                .map(|item| self.attach(item, node, subtree, path, token))
                .collect();
            stream::iter(attaches)
                .buffer_unordered(self.config.fan_out.max(1))
                .for_each(|()| async {})
                .await;
        } else {
            self.attach(value, node, subtree, path, token).await;
        }
    }

    async fn attach(
        &self,
        entity: &mut Value,
        node: &ExpansionNode,
        subtree: &PathTree,
        path: &str,
        token: &CancellationToken,
    ) {
        if !entity.is_object() {
            return;
        }

        let parent: &Value = entity;
        let (names, branches): (Vec<&str>, Vec<_>) = subtree
            .children
            .iter()
            .filter_map(|(name, child_tree)| {
                let child = node.expands.get(name)?;
                let child_path = format!("{}.{}", path, name);
                let branch = self.fetch_branch(child, child_tree, parent, child_path, token);
                Some((name.as_str(), branch))
            })
            .unzip();
        let results = join_all(branches).await;

        if let Value::Object(fields) = entity {
            for (name, result) in names.into_iter().zip(results) {
                if let Some(value) = result {
                    fields.insert(name.to_string(), value);
                }
            }
        }
    }
}
