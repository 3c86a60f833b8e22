//! # Query parameters
//!
//! Splits the framework-delivered query string pairs into the reserved
//! parameters consumed by the core (`sort`, `page`, `limit`, `expand`) and
//! caller-supplied filters.

use serde_json::Value;

use crate::error::{QueryError, QueryResult};
use crate::filter::FilterSet;
use crate::sort::SortSpec;

/// Reserved parameter names. Everything else is a filter.
pub const RESERVED_PARAMS: [&str; 4] = ["sort", "page", "limit", "expand"];

/// Page window defaults applied when the caller omits `page`/`limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    /// Limit used when none is supplied.
    pub default_limit: u64,
    /// Upper bound for a supplied limit.
    pub max_limit: u64,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Parsed query parameters of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Sort directive.
    pub sort: SortSpec,
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Requested expansion paths, de-duplicated, in request order.
    pub expand: Vec<String>,
    /// Caller-supplied equality filters.
    pub filters: FilterSet,
}

impl QueryParams {
    /// Parameters with nothing requested.
    pub fn empty(defaults: PageDefaults) -> Self {
        Self {
            sort: SortSpec::new(),
            page: 1,
            limit: defaults.default_limit,
            expand: Vec::new(),
            filters: FilterSet::new(),
        }
    }

    /// Parse raw `(key, value)` pairs.
    ///
    /// `page` must be a positive integer and `limit` a non-negative integer;
    /// a limit above `max_limit` is clamped. Filter values are decoded as
    /// JSON scalars when possible (`closed=false` filters on the boolean),
    /// otherwise kept as strings.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::{PageDefaults, QueryParams};
    ///
    /// let params = QueryParams::from_pairs(
    ///     [("sort", "createdAt|desc"), ("expand", "author,comments.user"), ("closed", "false")],
    ///     PageDefaults::default(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(params.page, 1);
    /// assert_eq!(params.expand, vec!["author", "comments.user"]);
    /// assert_eq!(params.filters.get("closed"), Some(&serde_json::json!(false)));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I, defaults: PageDefaults) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::empty(defaults);

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();

            match key {
                "sort" => params.sort = SortSpec::parse(value),
                "page" => params.page = parse_page(value)?,
                "limit" => params.limit = parse_limit(value, defaults)?,
                "expand" => params.add_expand(value),
                _ => params.filters.insert(key, decode_filter_value(value)),
            }
        }

        Ok(params)
    }

    /// Offset of the first entity of the current page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    fn add_expand(&mut self, raw: &str) {
        for path in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !self.expand.iter().any(|p| p == path) {
                self.expand.push(path.to_string());
            }
        }
    }
}

fn parse_page(raw: &str) -> QueryResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(page) if page >= 1 => Ok(page),
        Ok(_) => Err(QueryError::invalid_parameter("page", "must be at least 1")),
        Err(_) => Err(QueryError::invalid_parameter(
            "page",
            format!("'{}' is not a positive integer", raw),
        )),
    }
}

fn parse_limit(raw: &str, defaults: PageDefaults) -> QueryResult<u64> {
    let limit = raw.trim().parse::<u64>().map_err(|_| {
        QueryError::invalid_parameter("limit", format!("'{}' is not a non-negative integer", raw))
    })?;
    Ok(limit.min(defaults.max_limit))
}

fn decode_filter_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}
