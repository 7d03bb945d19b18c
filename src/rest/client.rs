//! The client facade.
//!
//! [`PipedriveClient`] bundles a [`Transport`] with the [`FieldRegistry`]
//! every entity consults. It is cheap to clone; entities and result sets
//! each carry a clone.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::{ApiToken, PipedriveClient, PipedriveConfig, QueryParams, ResourceKind};
//!
//! let config = PipedriveConfig::builder()
//!     .api_token(ApiToken::new("your-api-token")?)
//!     .page_size(100)
//!     .build()?;
//! let client = PipedriveClient::new(&config)?;
//!
//! let mut people = client.search(ResourceKind::Person, "Ada", QueryParams::new()).await?;
//! while let Some(mut person) = people.next().await? {
//!     println!("{:?}", person.get_value("name").await?);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::PipedriveConfig;
use crate::rest::path::{build_path, FIND_COMMAND};
use crate::rest::registry::{FieldRegistry, FieldSchema};
use crate::rest::{Entity, ResourceError, ResourceKind, ResultSet};
use crate::transport::{QueryParams, RestTransport, Transport};

/// Query parameter of the search endpoint.
const SEARCH_TERM_PARAM: &str = "term";

/// Entry point of the object model.
#[derive(Clone)]
pub struct PipedriveClient {
    transport: Arc<dyn Transport>,
    registry: Arc<FieldRegistry>,
}

// Verify PipedriveClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PipedriveClient>();
};

impl PipedriveClient {
    /// Creates a client over the REST API with a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] if the HTTP client cannot be created.
    pub fn new(config: &PipedriveConfig) -> Result<Self, ResourceError> {
        let transport = RestTransport::new(config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            Arc::new(FieldRegistry::new()),
        ))
    }

    /// Creates a client over any transport and registry.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// The transport requests go through.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The shared field registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }

    /// Creates an entity by id. Nothing is fetched until it is read.
    #[must_use]
    pub fn entity(&self, kind: ResourceKind, id: u64) -> Entity {
        Entity::new(self.clone(), kind, id)
    }

    /// Creates an entity whose cache starts as `data`.
    #[must_use]
    pub fn entity_with_preload(
        &self,
        kind: ResourceKind,
        id: u64,
        data: Map<String, Value>,
    ) -> Entity {
        Entity::with_preload(self.clone(), kind, id, data)
    }

    /// Loads (once) the field schema of a kind.
    ///
    /// Returns `Ok(None)` for kinds without custom fields.
    ///
    /// # Errors
    ///
    /// Any error of loading the field definitions.
    pub async fn load_fields(
        &self,
        kind: ResourceKind,
    ) -> Result<Option<Arc<FieldSchema>>, ResourceError> {
        self.registry.load(kind, self.transport.as_ref()).await
    }

    /// Lists all records of a kind matching `filters`.
    ///
    /// # Errors
    ///
    /// Any error of fetching the first page.
    pub async fn list(
        &self,
        kind: ResourceKind,
        filters: QueryParams,
    ) -> Result<ResultSet, ResourceError> {
        let path = build_path(kind.segment(), None, None);
        ResultSet::open(self.clone(), kind, path, filters).await
    }

    /// Searches records of a kind by `term`.
    ///
    /// # Errors
    ///
    /// Any error of fetching the first page.
    pub async fn search(
        &self,
        kind: ResourceKind,
        term: &str,
        mut filters: QueryParams,
    ) -> Result<ResultSet, ResourceError> {
        filters.insert(SEARCH_TERM_PARAM.to_string(), term.to_string());
        let path = build_path(kind.segment(), None, Some(FIND_COMMAND));
        ResultSet::open(self.clone(), kind, path, filters).await
    }
}

impl fmt::Debug for PipedriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipedriveClient")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
