//! # Sort directives
//!
//! Parses the compact `sort` query parameter (`field|direction,...`) into an
//! ordered sort specification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Direction of a single sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (the default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Normalize a direction token.
    ///
    /// `asc`/`1` map to ascending and `desc`/`-1` to descending, compared
    /// case-insensitively. Anything else falls back to ascending instead of
    /// failing.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::SortDirection;
    ///
    /// assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
    /// assert_eq!(SortDirection::parse("-1"), SortDirection::Desc);
    /// assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "desc" | "-1" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    /// Get the string representation of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Check if this is descending.
    pub fn is_desc(&self) -> bool {
        matches!(self, SortDirection::Desc)
    }
}

/// Ordered list of sort keys.
///
/// Field order follows the order of the tokens in the raw directive, so
/// later keys only break ties left by earlier ones. Serializes as a plain
/// `{"field": "asc"}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    keys: IndexMap<String, SortDirection>,
}

impl SortSpec {
    /// Create an empty sort specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw `sort` directive.
    ///
    /// Tokens are comma separated, each either `field` or `field|direction`.
    /// Empty tokens are ignored. A field that appears twice keeps its first
    /// position and takes the last direction.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_query::{SortDirection, SortSpec};
    ///
    /// let spec = SortSpec::parse("priority|-1,createdAt");
    /// assert_eq!(spec.get("priority"), Some(SortDirection::Desc));
    /// assert_eq!(spec.get("createdAt"), Some(SortDirection::Asc));
    /// assert!(SortSpec::parse("").is_empty());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut spec = Self::new();

        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let (field, direction) = match token.split_once('|') {
                Some((field, direction)) => (field.trim(), SortDirection::parse(direction)),
                None => (token, SortDirection::Asc),
            };

            if field.is_empty() {
                continue;
            }

            spec.keys.insert(field.to_string(), direction);
        }

        spec
    }

    /// Parse an optional directive; `None` yields an empty spec.
    pub fn parse_opt(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Append a key, keeping the position of an existing one.
    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.keys.insert(field.into(), direction);
    }

    /// Direction for a field, if it is part of the spec.
    pub fn get(&self, field: &str) -> Option<SortDirection> {
        self.keys.get(field).copied()
    }

    /// Iterate keys in tie-break order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of sort keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if there are no sort keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
