//! The transport contract the object model depends on.
//!
//! The core never talks HTTP itself. Every read, list, write and schema load
//! goes through a [`Transport`], which hands back decoded envelope data.
//! [`RestTransport`] is the production implementation over [`HttpClient`];
//! tests inject scripted implementations instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::{PipedriveConfig, ApiToken, RestTransport, Transport};
//!
//! let config = PipedriveConfig::builder()
//!     .api_token(ApiToken::new("token").unwrap())
//!     .build()
//!     .unwrap();
//! let transport = RestTransport::new(&config)?;
//!
//! let (data, url) = transport.fetch("deals", Some(42)).await?;
//! println!("{url}: {data}");
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::clients::{HttpClient, HttpRequest, HttpRequestBuilder};
use crate::config::PipedriveConfig;
use crate::rest::envelope::{self, Page};
use crate::rest::path::{build_path, MERGE_COMMAND};
use crate::rest::{FieldDefinition, ResourceError};

/// Query parameters of a collection request.
pub type QueryParams = HashMap<String, String>;

/// Executes reads, lists and writes against the remote.
///
/// Implementations decode the response envelope; callers receive the `data`
/// member only. Implementations perform no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads a single record (or a whole collection when `id` is `None`).
    ///
    /// Returns the envelope's `data` member together with the resolved URL.
    async fn fetch(&self, segment: &str, id: Option<u64>) -> Result<(Value, String), ResourceError>;

    /// Reads one page of a collection starting at cursor `start`.
    async fn list(
        &self,
        path: &str,
        params: &QueryParams,
        start: u64,
    ) -> Result<Page, ResourceError>;

    /// Writes the given fields of one record.
    ///
    /// Returns the record as echoed by the remote, when it sends one back.
    async fn update(
        &self,
        segment: &str,
        id: u64,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, ResourceError>;

    /// Loads the field definitions of a resource kind.
    async fn load_field_defs(
        &self,
        field_segment: &str,
    ) -> Result<Vec<FieldDefinition>, ResourceError>;

    /// Merges record `id` into record `target_id`.
    async fn merge(
        &self,
        segment: &str,
        id: u64,
        target_id: u64,
    ) -> Result<Option<Value>, ResourceError>;
}

/// [`Transport`] over the Pipedrive REST API.
#[derive(Debug)]
pub struct RestTransport {
    http_client: HttpClient,
    page_size: Option<u32>,
}

// Verify RestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestTransport>();
};

impl RestTransport {
    /// Creates a REST transport from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] if the HTTP client cannot be created.
    pub fn new(config: &PipedriveConfig) -> Result<Self, ResourceError> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
            page_size: config.page_size(),
        })
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    async fn get(&self, request: HttpRequestBuilder) -> Result<(Value, String), ResourceError> {
        let request = request.build().map_err(|e| ResourceError::Http(e.into()))?;

        // Reads report failure inside the envelope, whatever the status.
        let response = self.http_client.request(request).await?;
        Ok((response.body, response.url))
    }

    async fn put(&self, path: &str, body: Value) -> Result<Option<Value>, ResourceError> {
        let request = HttpRequest::put(path, body)
            .build()
            .map_err(|e| ResourceError::Http(e.into()))?;

        let response = self.http_client.request_ok(request).await?;
        tracing::debug!("Update status code: {}", response.code);

        Ok(response.body.get("data").cloned())
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn fetch(&self, segment: &str, id: Option<u64>) -> Result<(Value, String), ResourceError> {
        let path = build_path(segment, id, None);
        tracing::debug!("Fetching resource {:?} ({}) at {}", id, segment, path);

        let (body, url) = self.get(HttpRequest::get(path)).await?;
        let data = envelope::decode(&body, &url)?;
        Ok((data, url))
    }

    async fn list(
        &self,
        path: &str,
        params: &QueryParams,
        start: u64,
    ) -> Result<Page, ResourceError> {
        let mut request = HttpRequest::get(path)
            .query(params)
            .query_param("start", start);
        if let Some(limit) = self.page_size {
            request = request.default_query_param("limit", limit);
        }

        tracing::debug!("Listing {} from cursor {}", path, start);
        let (body, url) = self.get(request).await?;
        envelope::decode_page(&body, &url)
    }

    async fn update(
        &self,
        segment: &str,
        id: u64,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, ResourceError> {
        let path = build_path(segment, Some(id), None);
        tracing::debug!("Updating resource {} ({}) at {}", id, segment, path);

        self.put(&path, Value::Object(fields)).await
    }

    async fn load_field_defs(
        &self,
        field_segment: &str,
    ) -> Result<Vec<FieldDefinition>, ResourceError> {
        let path = build_path(field_segment, None, None);
        tracing::debug!("Loading field definitions at {}", path);

        let (body, url) = self.get(HttpRequest::get(path)).await?;
        let data = envelope::decode(&body, &url)?;

        let Value::Array(items) = data else {
            return Err(ResourceError::protocol(
                "field definitions are not a list",
                url,
            ));
        };

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    ResourceError::protocol(format!("malformed field definition: {e}"), &url)
                })
            })
            .collect()
    }

    async fn merge(
        &self,
        segment: &str,
        id: u64,
        target_id: u64,
    ) -> Result<Option<Value>, ResourceError> {
        let path = build_path(segment, Some(id), Some(MERGE_COMMAND));
        tracing::debug!("Merging resource {} ({}) into {}", id, segment, target_id);

        self.put(&path, json!({ "merge_with_id": target_id })).await
    }
}
