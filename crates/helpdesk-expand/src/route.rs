//! Route templates of expandable relations.
//!
//! A template is a path with `{placeholder}` segments. `{id}` stands for the
//! parent entity's identifier; any other placeholder names a field of the
//! parent (`/users/{ownerId}`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::MapError;

/// Placeholder bound to the parent identifier.
pub const ID_PLACEHOLDER: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidRoute`] for an empty template, an unclosed `{`, a
    /// stray `}` or an empty placeholder.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_expand::RouteTemplate;
    ///
    /// let route = RouteTemplate::parse("/tickets/{id}/comments").unwrap();
    /// assert_eq!(route.placeholders().collect::<Vec<_>>(), vec!["id"]);
    /// assert!(RouteTemplate::parse("/users/{ownerId").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, MapError> {
        let invalid = |message: &str| MapError::InvalidRoute {
            route: raw.to_string(),
            message: message.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("route is empty"));
        }

        let mut segments = Vec::new();
        let mut rest = raw;

        while !rest.is_empty() {
            match rest.find(|c: char| c == '{' || c == '}') {
                None => {
                    segments.push(Segment::Literal(rest.to_string()));
                    break;
                }
                Some(pos) if rest[pos..].starts_with('}') => {
                    return Err(invalid("unexpected '}'"));
                }
                Some(open) => {
                    if open > 0 {
                        segments.push(Segment::Literal(rest[..open].to_string()));
                    }
                    let after = &rest[open + 1..];
                    let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
                    let name = after[..close].trim();
                    if name.is_empty() || name.contains('{') {
                        return Err(invalid("empty or nested placeholder"));
                    }
                    segments.push(Segment::Field(name.to_string()));
                    rest = &after[close + 1..];
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render the route for a parent entity.
    ///
    /// `{id}` takes the parent's `id_field`; other placeholders take the
    /// parent field of the same name. Returns `None` when a referenced field
    /// is missing or not a string/number.
    pub fn render(&self, parent: &Value, id_field: &str) -> Option<String> {
        let mut rendered = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Field(name) => {
                    let field = if name == ID_PLACEHOLDER { id_field } else { name.as_str() };
                    rendered.push_str(&scalar_to_string(parent.get(field)?)?);
                }
            }
        }
        Some(rendered)
    }
}

/// String form of an identifier-like value.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl TryFrom<String> for RouteTemplate {
    type Error = MapError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<RouteTemplate> for String {
    fn from(route: RouteTemplate) -> Self {
        route.raw
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
