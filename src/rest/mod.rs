//! The resource object model.
//!
//! This module layers records on top of the [`Transport`](crate::Transport):
//!
//! - **[`ResourceKind`]**: the static table of record kinds, their URL
//!   segments and their [`Relation`]s
//! - **[`FieldRegistry`]**: per-kind mapping between readable field names
//!   and the remote's field keys
//! - **[`Entity`]**: one record, with a lazy cache, dirty tracking and
//!   minimal-diff saves
//! - **[`ResultSet`]**: cursor-based pagination over a collection
//! - **[`PipedriveClient`]**: the entry point tying them together
//! - **[`ResourceError`]**: every failure the object model reports
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::{FieldValue, PipedriveClient, ResourceKind};
//!
//! let client = PipedriveClient::new(&config)?;
//! let mut deal = client.entity(ResourceKind::Deal, 42);
//!
//! // Custom fields are addressed by their label, not their hash key
//! deal.set("lead_score", 80).await?;
//! deal.save().await?;
//!
//! // Foreign keys come back as references
//! if let FieldValue::Reference(person) = deal.get("person_id").await? {
//!     let mut person = person.resolve(deal.client());
//!     println!("{:?}", person.get_value("name").await?);
//! }
//! ```

mod client;
mod entity;
mod errors;
mod kind;
mod registry;
mod result_set;
mod value;

pub mod envelope;
pub mod path;

// Public exports
pub use client::PipedriveClient;
pub use entity::Entity;
pub use envelope::Page;
pub use errors::{ResourceError, DEFAULT_REMOTE_ERROR};
pub use kind::{Relation, ResourceKind};
pub use path::build_path;
pub use registry::{
    to_snake_case, FieldConfig, FieldDefinition, FieldRegistry, FieldSchema,
    CUSTOM_FIELD_KEY_LEN,
};
pub use result_set::ResultSet;
pub use value::{EntityRef, FieldValue, RefTarget};
