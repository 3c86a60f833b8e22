//! Relation paths requested by a client.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::map::{path_segments, ExpansionMap};

/// Ordered, de-duplicated expansion paths (`"owner"`, `"comments.author"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionRequest {
    paths: IndexSet<String>,
}

impl ExpansionRequest {
    /// Request nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated `expand` parameter.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    /// Add a path; blank and repeated paths are ignored.
    pub fn push(&mut self, path: impl AsRef<str>) -> &mut Self {
        let path = path.as_ref().trim();
        if !path.is_empty() {
            self.paths.insert(path.to_string());
        }
        self
    }

    /// Requested paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Build the tree of relations to fetch.
    ///
    /// Paths that do not resolve in `map`, or that are longer than
    /// `max_depth`, are dropped with a debug log.
    pub(crate) fn plan(&self, map: &ExpansionMap, max_depth: usize) -> PathTree {
        let mut tree = PathTree::default();
        for path in self.paths() {
            let segments = match path_segments(path) {
                Some(segments) if map.node(path).is_some() => segments,
                _ => {
                    tracing::debug!(path = %path, "Skipping unknown expansion path");
                    continue;
                }
            };
            if segments.len() > max_depth {
                tracing::debug!(
                    path = %path,
                    depth = segments.len(),
                    max_depth = max_depth,
                    "Skipping expansion path deeper than allowed"
                );
                continue;
            }
            tree.insert(&segments);
        }
        tree
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExpansionRequest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut request = Self::new();
        for path in iter {
            request.push(path);
        }
        request
    }
}

/// Requested relations grouped by parent, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PathTree {
    pub(crate) children: IndexMap<String, PathTree>,
}

impl PathTree {
    fn insert(&mut self, segments: &[&str]) {
        if let Some((first, rest)) = segments.split_first() {
            self.children
                .entry((*first).to_string())
                .or_default()
                .insert(rest);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map() -> ExpansionMap {
        ExpansionMap::from_value(json!({
            "owner": {"route": "/users/{ownerId}"},
            "comments": {
                "route": "/tickets/{id}/comments",
                "expands": {
                    "author": {
                        "route": "/users/{authorId}",
                        "expands": {"avatar": {"route": "/uploads/{avatarId}"}}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_dedups_in_order() {
        let request = ExpansionRequest::parse(" owner, comments.author ,owner,,");
        assert_eq!(request.paths().collect::<Vec<_>>(), vec!["owner", "comments.author"]);
    }

    #[test]
    fn test_plan_groups_by_parent() {
        let request: ExpansionRequest = ["comments.author", "owner", "comments"].into_iter().collect();
        let tree = request.plan(&map(), 3);

        assert_eq!(tree.children.keys().collect::<Vec<_>>(), vec!["comments", "owner"]);
        assert!(tree.children["comments"].children.contains_key("author"));
        assert!(tree.children["owner"].is_empty());
    }

    #[test]
    fn test_plan_skips_unknown_paths() {
        let request = ExpansionRequest::parse("assignee,comments.editor,comments..author");
        assert!(request.plan(&map(), 3).is_empty());
    }

    #[test]
    fn test_plan_respects_max_depth() {
        let request = ExpansionRequest::parse("comments/author/avatar,owner");
        let tree = request.plan(&map(), 2);
        assert_eq!(tree.children.keys().collect::<Vec<_>>(), vec!["owner"]);

        let tree = request.plan(&map(), 3);
        assert!(tree.children["comments"].children["author"].children.contains_key("avatar"));
    }
}
