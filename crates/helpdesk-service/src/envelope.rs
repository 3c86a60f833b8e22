//! Response envelope: `{"data": ..., "meta": {...}}`.

use serde::Serialize;
use serde_json::Value;

use helpdesk_query::ResponseMetadata;

/// A successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    /// One entity or a page of entities
    pub data: T,
    /// URL and, for lists, pagination
    pub meta: ResponseMetadata,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap data with its metadata.
    pub fn new(data: T, meta: ResponseMetadata) -> Self {
        Self { data, meta }
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_query::{Pagination, SortSpec};
    use serde_json::json;

    #[test]
    fn test_list_envelope_shape() {
        let pagination = Pagination::new(3, 1, 2, Some(SortSpec::parse("createdAt|desc")));
        let meta = ResponseMetadata::build("http://localhost:1337/tickets", Some(&pagination));
        let envelope = Envelope::new(vec![json!({"id": "t-1"}), json!({"id": "t-2"})], meta);

        assert_eq!(
            envelope.to_value().unwrap(),
            json!({
                "data": [{"id": "t-1"}, {"id": "t-2"}],
                "meta": {
                    "url": "http://localhost:1337/tickets",
                    "paginator": {
                        "total_entries": 3,
                        "total_pages": 2,
                        "page": 1,
                        "per_page": 2,
                        "sort": {"createdAt": "desc"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_single_envelope_has_no_paginator() {
        let meta = ResponseMetadata::build("http://localhost:1337/tickets/t-1", None);
        let envelope = Envelope::new(json!({"id": "t-1"}), meta);

        assert_eq!(
            envelope.to_value().unwrap(),
            json!({"data": {"id": "t-1"}, "meta": {"url": "http://localhost:1337/tickets/t-1"}})
        );
    }
}
