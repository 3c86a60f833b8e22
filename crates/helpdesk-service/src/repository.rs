//! Document repository capability
//!
//! The pipeline only needs one read primitive: find the documents of a
//! collection matching a filter set, sorted and windowed. [`MemoryRepository`]
//! implements it over in-process JSON documents for embedding and tests.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use helpdesk_query::{FilterSet, SortSpec};

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed
    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// The query cannot be executed by this store
    #[error("Unsupported query: {0}")]
    Unsupported(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A composed read query.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    /// Equality predicates, scope included
    pub filters: FilterSet,
    /// Sort keys in priority order
    pub sort: SortSpec,
    /// 1-based page
    pub page: u64,
    /// Page size
    pub limit: u64,
}

impl FindQuery {
    /// Documents skipped before the page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of documents plus the size of the whole match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindResult {
    /// Documents of the requested page
    pub items: Vec<Value>,
    /// Documents matching the filters across all pages
    pub item_count: u64,
}

/// Read access to a document store.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Find documents of `collection` matching `query`.
    async fn find(&self, collection: &str, query: &FindQuery) -> RepositoryResult<FindResult>;
}

/// In-memory repository.
///
/// Collections are created on first insert; an unknown collection is empty.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl std::fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository").finish_non_exhaustive()
    }
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to a collection.
    pub async fn insert(&self, collection: impl Into<String>, document: Value) {
        self.collections
            .write()
            .await
            .entry(collection.into())
            .or_default()
            .push(document);
    }

    /// Append several documents to a collection.
    pub async fn extend(&self, collection: impl Into<String>, documents: impl IntoIterator<Item = Value>) {
        self.collections
            .write()
            .await
            .entry(collection.into())
            .or_default()
            .extend(documents);
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find(&self, collection: &str, query: &FindQuery) -> RepositoryResult<FindResult> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(FindResult::default());
        };

        let mut matched: Vec<&Value> = documents
            .iter()
            .filter(|doc| matches_filters(doc, &query.filters))
            .collect();
        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_documents(a, b, &query.sort));
        }

        let item_count = matched.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(FindResult { items, item_count })
    }
}

/// Every predicate must equal the document's top-level field. A `null`
/// predicate also matches a missing field.
fn matches_filters(document: &Value, filters: &FilterSet) -> bool {
    filters.iter().all(|(field, expected)| match document.get(field) {
        Some(actual) => actual == expected,
        None => expected.is_null(),
    })
}

fn compare_documents(a: &Value, b: &Value, sort: &SortSpec) -> Ordering {
    for (field, direction) in sort.iter() {
        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = if direction.is_desc() {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// missing/null < booleans < numbers < strings < arrays and objects
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
