//! Service configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for local development.

use serde::{Deserialize, Serialize};

use helpdesk_expand::{ConfigError, ExpandConfig, FetcherConfig};
use helpdesk_query::PageDefaults;

/// Configuration of the resource pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Page size when the request has no `limit`.
    pub default_page_limit: u64,

    /// Largest accepted `limit`.
    pub max_page_limit: u64,

    /// Entities of one page expanded at the same time.
    pub list_expand_concurrency: usize,

    /// Public base URL used in response metadata.
    pub public_base_url: String,

    /// Expansion resolver settings.
    pub expand: ExpandConfig,

    /// Related-entity fetcher settings.
    pub fetcher: FetcherConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 20,
            max_page_limit: 100,
            list_expand_concurrency: 8,
            public_base_url: "http://localhost:1337".to_string(),
            expand: ExpandConfig::default(),
            fetcher: FetcherConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DEFAULT_PAGE_LIMIT`: Page size without `limit` (default: 20)
    /// - `MAX_PAGE_LIMIT`: Largest accepted `limit` (default: 100)
    /// - `LIST_EXPAND_CONCURRENCY`: Entities expanded at once (default: 8)
    /// - `PUBLIC_BASE_URL`: Base URL of metadata links (default: http://localhost:1337)
    ///
    /// plus the variables read by [`ExpandConfig::from_env`] and
    /// [`FetcherConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            default_page_limit: number("DEFAULT_PAGE_LIMIT").unwrap_or(default.default_page_limit),
            max_page_limit: number("MAX_PAGE_LIMIT").unwrap_or(default.max_page_limit),
            list_expand_concurrency: number("LIST_EXPAND_CONCURRENCY")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(default.list_expand_concurrency),
            public_base_url: lookup("PUBLIC_BASE_URL").unwrap_or(default.public_base_url),
            expand: ExpandConfig::from_lookup(&lookup),
            fetcher: FetcherConfig::from_lookup(&lookup),
        }
    }

    /// Paging defaults for query parameter parsing.
    pub fn page_defaults(&self) -> PageDefaults {
        PageDefaults {
            default_limit: self.default_page_limit,
            max_limit: self.max_page_limit,
        }
    }

    /// Public URL of a collection or of one entity.
    pub fn entity_url(&self, resource: &str, id: Option<&str>) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        match id {
            Some(id) => format!("{}/{}/{}", base, resource, id),
            None => format!("{}/{}", base, resource),
        }
    }

    /// Reject unusable limits and expansion settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.default_page_limit == 0 {
            return Err(invalid("DEFAULT_PAGE_LIMIT", "must be greater than zero"));
        }
        if self.max_page_limit == 0 {
            return Err(invalid("MAX_PAGE_LIMIT", "must be greater than zero"));
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(invalid("DEFAULT_PAGE_LIMIT", "must not exceed MAX_PAGE_LIMIT"));
        }
        if self.list_expand_concurrency == 0 {
            return Err(invalid("LIST_EXPAND_CONCURRENCY", "must be greater than zero"));
        }
        self.expand.validate()
    }
}
