//! # Pipedrive API Rust Client
//!
//! A client-side object model over the Pipedrive CRM REST API: records are
//! addressed by id, fields by readable name, and changes are written back
//! as minimal diffs.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`PipedriveConfig`] and [`PipedriveConfigBuilder`]
//! - Validated newtypes for the API token and endpoint
//! - An async HTTP client that places the API token and reports rate limits
//! - A [`Transport`] seam, with [`RestTransport`] as the production implementation
//! - Custom-field name resolution through a shared [`FieldRegistry`]
//! - Lazy, cached records ([`Entity`]) with dirty tracking and single-call saves
//! - Cursor-based pagination ([`ResultSet`]) for lists, searches and relations
//!
//! ## Quick Start
//!
//! ```rust
//! use pipedrive_api::{ApiToken, PipedriveConfig};
//!
//! let config = PipedriveConfig::builder()
//!     .api_token(ApiToken::new("your-api-token").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().as_ref(), "https://api.pipedrive.com/v1");
//! ```
//!
//! ## Working with Records
//!
//! ```rust,ignore
//! use pipedrive_api::{PipedriveClient, QueryParams, ResourceKind};
//!
//! let client = PipedriveClient::new(&config)?;
//!
//! // Lazy: nothing is fetched until the first read
//! let mut person = client.entity(ResourceKind::Person, 7);
//! println!("{:?}", person.get_value("name").await?);
//!
//! // Only changed fields are sent, in one update
//! if person.set("lead_score", 90).await? {
//!     person.save().await?;
//! }
//!
//! // Nested collections are paginated result sets
//! let mut deals = person.relation("deals", QueryParams::new()).await?;
//! while let Some(deal) = deals.next().await? {
//!     println!("deal {}", deal.id());
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and the field registry are instances passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Sequential requests**: Every operation awaits its requests in order; nothing is spawned
//! - **No hidden retries**: Failures surface to the caller unchanged
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;
pub mod transport;

// Re-export public types at crate root for convenience
pub use config::{ApiToken, Endpoint, PipedriveConfig, PipedriveConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, RateLimit,
};

// Re-export the object model
pub use rest::{
    Entity, EntityRef, FieldDefinition, FieldRegistry, FieldSchema, FieldValue, PipedriveClient,
    RefTarget, Relation, ResourceError, ResourceKind, ResultSet,
};
pub use transport::{QueryParams, RestTransport, Transport};
