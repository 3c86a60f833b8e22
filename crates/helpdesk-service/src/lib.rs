//! # Helpdesk Service
//!
//! The scoped read pipeline behind every helpdesk resource.
//!
//! ## Overview
//!
//! The helpdesk-service crate handles:
//! - **Context**: Per-request principal, parameters, filters and cancellation
//! - **Repository**: The document-store capability and an in-memory store
//! - **Pipeline**: Authorize, compose filters, find, expand, wrap
//! - **Catalog**: Access rules and relations of the built-in resources
//! - **Errors**: Status codes, error codes and response bodies
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use helpdesk_expand::{FetcherConfig, HttpFetcher};
//! use helpdesk_rbac::{Principal, ResourceType};
//! use helpdesk_service::{Catalog, MemoryRepository, RequestContext, ResourceService, ServiceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ServiceConfig::from_env());
//! let tickets = ResourceService::from_catalog(
//!     &Catalog::helpdesk()?,
//!     ResourceType::Ticket,
//!     Arc::new(MemoryRepository::new()),
//!     Arc::new(HttpFetcher::new(config.fetcher.clone())?),
//!     config.clone(),
//! );
//!
//! let mut ctx = RequestContext::from_query(
//!     Some(Principal::user("u-1")),
//!     [("sort", "createdAt|desc"), ("expand", "owner")],
//!     config.page_defaults(),
//! )?;
//! let envelope = tickets.list(&mut ctx).await?;
//! println!("{}", envelope.to_value()?);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod repository;
pub mod service;

pub use catalog::{helpdesk_descriptor, helpdesk_expansions, Catalog};
pub use config::ServiceConfig;
pub use context::RequestContext;
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, ErrorBody, ErrorDetail};
pub use repository::{
    FindQuery, FindResult, MemoryRepository, Repository, RepositoryError, RepositoryResult,
};
pub use service::ResourceService;
