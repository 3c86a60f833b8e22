//! # Response metadata
//!
//! Builds the `meta` block of a response envelope: the entity URL and, for
//! paginated listings, a paginator block.

use serde::{Deserialize, Serialize};

use crate::sort::SortSpec;

/// Pagination figures of a listing, as produced by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of matching entities.
    pub item_count: u64,
    /// Number of pages for the current limit.
    pub page_count: u64,
    /// Current page (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Sort applied to the listing.
    pub sort_by: Option<SortSpec>,
}

impl Pagination {
    /// Compute pagination figures for a listing.
    ///
    /// `page_count` is `ceil(item_count / limit)`, and zero when `limit` is
    /// zero. An empty sort spec is dropped.
    pub fn new(item_count: u64, page: u64, limit: u64, sort_by: Option<SortSpec>) -> Self {
        let page_count = if limit == 0 {
            0
        } else {
            item_count.div_ceil(limit)
        };

        Self {
            item_count,
            page_count,
            page,
            limit,
            sort_by: sort_by.filter(|s| !s.is_empty()),
        }
    }
}

/// Paginator block of the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    /// Total matching entities.
    pub total_entries: u64,
    /// Total pages.
    pub total_pages: u64,
    /// Current page.
    pub page: u64,
    /// Page size.
    pub per_page: u64,
    /// Sort applied to the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
}

/// Metadata decorating a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// URL of the entity or collection.
    pub url: String,
    /// Pagination block, only for listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<Paginator>,
}

impl ResponseMetadata {
    /// Build metadata for a response.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::{Pagination, ResponseMetadata};
    ///
    /// let meta = ResponseMetadata::build("/tickets", Some(&Pagination::new(45, 2, 20, None)));
    /// let paginator = meta.paginator.unwrap();
    /// assert_eq!(paginator.total_entries, 45);
    /// assert_eq!(paginator.total_pages, 3);
    /// assert_eq!(paginator.per_page, 20);
    /// ```
    pub fn build(entity_url: impl Into<String>, pagination: Option<&Pagination>) -> Self {
        Self {
            url: entity_url.into(),
            paginator: pagination.map(|p| Paginator {
                total_entries: p.item_count,
                total_pages: p.page_count,
                page: p.page,
                per_page: p.limit,
                sort: p.sort_by.clone(),
            }),
        }
    }
}
