//! # Helpdesk Query
//!
//! Request-level query primitives shared by every helpdesk resource.
//!
//! ## Overview
//!
//! The helpdesk-query crate handles:
//! - **Sort**: Parsing the compact `sort` directive into ordered keys
//! - **Filters**: The per-request filter set and its merge semantics
//! - **Deferred values**: Filter values resolved right before composition
//! - **Parameters**: Splitting query pairs into reserved params and filters
//! - **Metadata**: The `meta` block of a response envelope
//!
//! ## Merge semantics
//!
//! ```text
//! existing = {foo: 2, bar: 1}, incoming = {foo: 1, qux: 2}
//!
//!   KeepExisting → {foo: 2, bar: 1, qux: 2}
//!   Override     → {foo: 1, bar: 1, qux: 2}
//! ```
//!
//! Access-control scopes are always merged with `Override` so a caller can
//! never replace them with a filter of the same name.

pub mod error;
pub mod filter;
pub mod meta;
pub mod params;
pub mod sort;

pub use error::{QueryError, QueryResult};
pub use filter::{DeferredValue, FilterSet, FilterValue, MergeStrategy, PendingFilters};
pub use meta::{Pagination, Paginator, ResponseMetadata};
pub use params::{PageDefaults, QueryParams, RESERVED_PARAMS};
pub use sort::{SortDirection, SortSpec};
