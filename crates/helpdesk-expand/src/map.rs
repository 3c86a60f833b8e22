//! # Expansion maps
//!
//! The static tree of relations a resource allows clients to expand. A map
//! is built once from a declarative object and then only read, so one
//! instance is shared by every request through an `Arc`.
//!
//! ```json
//! {
//!   "owner":    {"route": "/users/{ownerId}"},
//!   "comments": {"route": "/tickets/{id}/comments",
//!                "expands": {"author": {"route": "/users/{authorId}"}}}
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::MapError;
use crate::route::RouteTemplate;

/// Separators accepted between path segments.
const PATH_SEPARATORS: [char; 2] = ['/', '.'];

/// Split an expansion path into segments.
///
/// Returns `None` for an empty path or one with an empty segment.
pub(crate) fn path_segments(path: &str) -> Option<Vec<&str>> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path.split(&PATH_SEPARATORS[..]).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

/// One expandable relation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpansionNode {
    /// Route fetching the related entity.
    pub route: RouteTemplate,
    /// Relations expandable from the fetched entity.
    #[serde(default)]
    pub expands: IndexMap<String, ExpansionNode>,
}

impl ExpansionNode {
    /// Leaf node.
    pub fn new(route: RouteTemplate) -> Self {
        Self {
            route,
            expands: IndexMap::new(),
        }
    }

    /// Leaf node from a raw template.
    pub fn route(route: &str) -> Result<Self, MapError> {
        Ok(Self::new(RouteTemplate::parse(route)?))
    }

    /// Add a nested relation.
    pub fn with_child(mut self, name: impl Into<String>, child: ExpansionNode) -> Self {
        self.expands.insert(name.into(), child);
        self
    }

    /// 1 for a leaf, otherwise 1 + the deepest child.
    pub fn depth(&self) -> usize {
        1 + self.expands.values().map(ExpansionNode::depth).max().unwrap_or(0)
    }

    /// Check if the node has no nested relations.
    pub fn is_leaf(&self) -> bool {
        self.expands.is_empty()
    }
}

/// Immutable tree of expandable relations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, ExpansionNode>")]
pub struct ExpansionMap {
    nodes: IndexMap<String, ExpansionNode>,
    depth: usize,
}

impl Default for ExpansionMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExpansionMap {
    /// Build a map from its top-level relations.
    pub fn new(nodes: IndexMap<String, ExpansionNode>) -> Self {
        let depth = nodes.values().map(ExpansionNode::depth).max().unwrap_or(1);
        Self { nodes, depth }
    }

    /// Map allowing no expansion.
    pub fn empty() -> Self {
        Self::new(IndexMap::new())
    }

    /// Build a map from a declarative JSON value.
    pub fn from_value(value: Value) -> Result<Self, MapError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Build a map from a declarative JSON string.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: add a top-level relation.
    pub fn with(mut self, name: impl Into<String>, node: ExpansionNode) -> Self {
        self.nodes.insert(name.into(), node);
        self.depth = self.nodes.values().map(ExpansionNode::depth).max().unwrap_or(1);
        self
    }

    /// Maximum depth of the tree; at least 1, even when empty.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Top-level relations.
    pub fn nodes(&self) -> &IndexMap<String, ExpansionNode> {
        &self.nodes
    }

    /// Check if nothing is expandable.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at the end of a path, if the whole path resolves.
    pub fn node(&self, path: &str) -> Option<&ExpansionNode> {
        let segments = path_segments(path)?;
        let (first, rest) = segments.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for segment in rest {
            node = node.expands.get(*segment)?;
        }
        Some(node)
    }

    /// Route of the relation at the end of `path`.
    ///
    /// Segments are separated by `/` (or `.`, as used in `expand` query
    /// parameters). An empty path, an empty segment or a segment missing
    /// from the tree resolves to `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_expand::ExpansionMap;
    ///
    /// let map = ExpansionMap::from_json(r#"{
    ///     "foo": {"route": "/foo/{id}"},
    ///     "bar": {"route": "/bar/{id}", "expands": {"baz": {"route": "/baz/{id}"}}}
    /// }"#).unwrap();
    ///
    /// assert_eq!(map.depth(), 2);
    /// assert_eq!(map.resolve("bar/baz").map(|r| r.as_str()), Some("/baz/{id}"));
    /// assert!(map.resolve("xxx").is_none());
    /// assert!(map.resolve("").is_none());
    /// ```
    pub fn resolve(&self, path: &str) -> Option<&RouteTemplate> {
        self.node(path).map(|node| &node.route)
    }
}

impl From<IndexMap<String, ExpansionNode>> for ExpansionMap {
    fn from(nodes: IndexMap<String, ExpansionNode>) -> Self {
        Self::new(nodes)
    }
}
