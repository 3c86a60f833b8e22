//! # Filters
//!
//! The per-request filter set and the composer that merges new predicates
//! into it. Caller-supplied filters may carry deferred values that are
//! resolved once, before composition.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};

/// How [`FilterSet::merge`] treats keys present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Incoming values replace existing values of the same key.
    Override,
    /// Existing values win; incoming keys are only added when absent.
    KeepExisting,
}

impl MergeStrategy {
    /// Map the boolean `override` flag used by route declarations.
    pub fn from_override(override_existing: bool) -> Self {
        if override_existing {
            MergeStrategy::Override
        } else {
            MergeStrategy::KeepExisting
        }
    }
}

/// Field name to predicate value mapping for one request.
///
/// A filter set belongs to exactly one in-flight request. It is only mutated
/// through [`FilterSet::merge`] and [`FilterSet::insert`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    predicates: IndexMap<String, Value>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter set holding a single predicate.
    pub fn single(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut set = Self::new();
        set.insert(field, value);
        set
    }

    /// Insert or replace one predicate.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.predicates.insert(field.into(), value.into());
    }

    /// Builder form of [`FilterSet::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Merge `other` into this set.
    ///
    /// With [`MergeStrategy::Override`] keys from `other` replace keys of the
    /// same name. With [`MergeStrategy::KeepExisting`] only keys absent from
    /// this set are added. Applying the same `other` twice with the same
    /// strategy leaves the set unchanged the second time.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::{FilterSet, MergeStrategy};
    ///
    /// let mut filters = FilterSet::new().with("foo", 2).with("bar", 1);
    /// let incoming = FilterSet::new().with("foo", 1).with("qux", 2);
    ///
    /// filters.merge(&incoming, MergeStrategy::KeepExisting);
    /// assert_eq!(filters.get("foo"), Some(&serde_json::json!(2)));
    /// assert_eq!(filters.get("qux"), Some(&serde_json::json!(2)));
    /// ```
    pub fn merge(&mut self, other: &FilterSet, strategy: MergeStrategy) -> &mut Self {
        for (field, value) in &other.predicates {
            match strategy {
                MergeStrategy::Override => {
                    self.predicates.insert(field.clone(), value.clone());
                }
                MergeStrategy::KeepExisting => {
                    self.predicates
                        .entry(field.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }
        self
    }

    /// Value of a predicate.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.predicates.get(field)
    }

    /// Check if a predicate on `field` exists.
    pub fn contains(&self, field: &str) -> bool {
        self.predicates.contains_key(field)
    }

    /// Iterate predicates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = FilterSet::new();
        for (field, value) in iter {
            set.insert(field, value);
        }
        set
    }
}

/// A value computed at request time, such as "the id of the current user".
#[async_trait]
pub trait DeferredValue: Send + Sync {
    /// Produce the predicate value.
    async fn resolve(&self) -> QueryResult<Value>;
}

/// A filter predicate value as declared by a route or supplied by a caller.
#[derive(Clone)]
pub enum FilterValue {
    /// A value known up front.
    Literal(Value),
    /// A value produced by a resolver right before composition.
    Deferred(Arc<dyn DeferredValue>),
}

impl FilterValue {
    /// Wrap a deferred resolver.
    pub fn deferred(resolver: impl DeferredValue + 'static) -> Self {
        FilterValue::Deferred(Arc::new(resolver))
    }

    /// Resolve to a concrete value.
    pub async fn resolve(&self) -> QueryResult<Value> {
        match self {
            FilterValue::Literal(value) => Ok(value.clone()),
            FilterValue::Deferred(resolver) => resolver.resolve().await,
        }
    }

    /// Check if the value still needs resolving.
    pub fn is_deferred(&self) -> bool {
        matches!(self, FilterValue::Deferred(_))
    }
}

impl fmt::Debug for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            FilterValue::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl<T: Into<Value>> From<T> for FilterValue {
    fn from(value: T) -> Self {
        FilterValue::Literal(value.into())
    }
}

/// Filters whose values may still be deferred.
#[derive(Debug, Clone, Default)]
pub struct PendingFilters {
    values: IndexMap<String, FilterValue>,
}

impl PendingFilters {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal or deferred value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Builder form of [`PendingFilters::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Number of pending values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve every value once and collect a [`FilterSet`].
    ///
    /// The first resolver failure aborts resolution and is reported as a
    /// validation error on that field.
    pub async fn resolve(&self) -> QueryResult<FilterSet> {
        let mut set = FilterSet::new();
        for (field, value) in &self.values {
            let resolved = value.resolve().await.map_err(|e| {
                tracing::debug!(field = %field, error = %e, "Deferred filter failed to resolve");
                QueryError::InvalidFilter {
                    field: field.clone(),
                    message: e.to_string(),
                }
            })?;
            set.insert(field.clone(), resolved);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(value: Value) -> FilterSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merge_into_empty() {
        let mut filters = FilterSet::new();
        filters.merge(&set(json!({"foo": 1})), MergeStrategy::KeepExisting);
        assert_eq!(filters, set(json!({"foo": 1})));
    }

    #[test]
    fn test_merge_keep_existing() {
        let mut filters = set(json!({"foo": 2, "bar": 1}));
        filters.merge(&set(json!({"foo": 1, "qux": 2})), MergeStrategy::KeepExisting);
        assert_eq!(filters, set(json!({"foo": 2, "bar": 1, "qux": 2})));
    }

    #[test]
    fn test_merge_override() {
        let mut filters = set(json!({"foo": 2, "bar": 1}));
        filters.merge(&set(json!({"foo": 1, "qux": 2})), MergeStrategy::Override);
        assert_eq!(filters, set(json!({"foo": 1, "bar": 1, "qux": 2})));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let scope = FilterSet::single("ownerId", "u-1");

        let mut once = set(json!({"ownerId": "u-2", "status": "open"}));
        once.merge(&scope, MergeStrategy::Override);

        let mut twice = once.clone();
        twice.merge(&scope, MergeStrategy::Override);

        assert_eq!(once, twice);
        assert_eq!(once.get("ownerId"), Some(&json!("u-1")));

        let mut keep = set(json!({"status": "open"}));
        keep.merge(&scope, MergeStrategy::KeepExisting);
        let snapshot = keep.clone();
        keep.merge(&scope, MergeStrategy::KeepExisting);
        assert_eq!(keep, snapshot);
    }

    #[test]
    fn test_from_override_flag() {
        assert_eq!(MergeStrategy::from_override(true), MergeStrategy::Override);
        assert_eq!(MergeStrategy::from_override(false), MergeStrategy::KeepExisting);
    }

    struct CurrentUser(&'static str);

    #[async_trait]
    impl DeferredValue for CurrentUser {
        async fn resolve(&self) -> QueryResult<Value> {
            Ok(json!(self.0))
        }
    }

    struct Broken;

    #[async_trait]
    impl DeferredValue for Broken {
        async fn resolve(&self) -> QueryResult<Value> {
            Err(QueryError::InvalidParameter {
                name: "attachment".to_string(),
                message: "unparsable payload".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_pending_filters_resolve_deferred_values() {
        let pending = PendingFilters::new()
            .with("closed", false)
            .with("ownerId", FilterValue::deferred(CurrentUser("u-7")));

        let resolved = pending.resolve().await.unwrap();
        assert_eq!(resolved, set(json!({"closed": false, "ownerId": "u-7"})));
    }

    #[tokio::test]
    async fn test_pending_filters_report_failing_field() {
        let pending = PendingFilters::new().with("attachment", FilterValue::deferred(Broken));
        let err = pending.resolve().await.unwrap_err();
        match err {
            QueryError::InvalidFilter { field, .. } => assert_eq!(field, "attachment"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_filter_value_debug_hides_resolver() {
        let value = FilterValue::deferred(Broken);
        assert!(value.is_deferred());
        assert_eq!(format!("{value:?}"), "Deferred(..)");
        assert!(!FilterValue::from(1).is_deferred());
    }
}
