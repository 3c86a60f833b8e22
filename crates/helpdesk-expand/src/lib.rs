//! # Helpdesk Expand
//!
//! On-demand inclusion of related entities in helpdesk responses.
//!
//! ## Overview
//!
//! The helpdesk-expand crate handles:
//! - **Expansion maps**: The static tree of relations a resource exposes
//! - **Routes**: Templates rendered from the parent entity's fields
//! - **Requests**: The `expand` paths a client asked for
//! - **Resolution**: Concurrent fetching under a deadline and a cancellation token
//! - **Fetching**: The [`RelatedFetcher`] capability and its HTTP implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use helpdesk_expand::{
//!     ExpandConfig, Expander, ExpansionMap, ExpansionRequest, FetcherConfig, HttpFetcher,
//! };
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let map = ExpansionMap::from_json(r#"{"owner": {"route": "/users/{ownerId}"}}"#)?;
//!     let fetcher = HttpFetcher::new(FetcherConfig::from_env())?;
//!     let config = ExpandConfig::from_env();
//!
//!     let ticket = json!({"id": "t-1", "ownerId": "u-1"});
//!     let expanded = Expander::new(&map, &fetcher, &config)
//!         .expand(ticket, &ExpansionRequest::parse("owner"), &CancellationToken::new())
//!         .await;
//!
//!     println!("{}", expanded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod map;
pub mod request;
pub mod resolver;
pub mod retry;
pub mod route;

pub use config::{ConfigError, ExpandConfig, FetcherConfig};
pub use error::{FetchError, FetchResult, MapError};
pub use fetcher::RelatedFetcher;
pub use http::HttpFetcher;
pub use map::{ExpansionMap, ExpansionNode};
pub use request::ExpansionRequest;
pub use resolver::Expander;
pub use retry::RetryConfig;
pub use route::RouteTemplate;
