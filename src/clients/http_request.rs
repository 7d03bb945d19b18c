//! Requests the REST transport sends.
//!
//! The transport issues two shapes of request: a `GET` with query
//! parameters (records, pages, field lists) and a `PUT` with a JSON object
//! body (updates and merges). [`HttpRequest::get`] and [`HttpRequest::put`]
//! start a builder for each.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used against the Pipedrive API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Reads.
    Get,
    /// Writes of partial records.
    Put,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Put => "put",
        })
    }
}

/// A request relative to the configured endpoint.
///
/// ```rust
/// use pipedrive_api::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let page = HttpRequest::get("deals")
///     .query_param("start", "100")
///     .build()
///     .unwrap();
/// assert_eq!(page.http_method, HttpMethod::Get);
///
/// let update = HttpRequest::put("deals/42", json!({"title": "Renewal"}))
///     .build()
///     .unwrap();
/// assert!(update.body.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method.
    pub http_method: HttpMethod,
    /// The path, relative to the endpoint.
    pub path: String,
    /// The JSON body of a `PUT`.
    pub body: Option<Value>,
    /// Query parameters, not including the API token.
    pub query: HashMap<String, String>,
}

impl HttpRequest {
    /// Starts a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(HttpMethod::Get, path.into(), None)
    }

    /// Starts a `PUT` request carrying `body`.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> HttpRequestBuilder {
        HttpRequestBuilder::new(HttpMethod::Put, path.into(), Some(body))
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::EmptyPath`] if the path names nothing
    /// - [`InvalidHttpRequestError::NonObjectBody`] if a body is not a JSON
    ///   object
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.path.trim_matches('/').is_empty() {
            return Err(InvalidHttpRequestError::EmptyPath);
        }
        if self.body.as_ref().is_some_and(|body| !body.is_object()) {
            return Err(InvalidHttpRequestError::NonObjectBody {
                method: self.http_method.to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    fn new(http_method: HttpMethod, path: String, body: Option<Value>) -> Self {
        Self {
            request: HttpRequest {
                http_method,
                path,
                body,
                query: HashMap::new(),
            },
        }
    }

    /// Adds every parameter of `query`, replacing same-named ones.
    #[must_use]
    pub fn query(mut self, query: &HashMap<String, String>) -> Self {
        self.request
            .query
            .extend(query.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Sets a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request.query.insert(key.into(), value.to_string());
        self
    }

    /// Sets a query parameter unless the request already carries one by
    /// that name.
    #[must_use]
    pub fn default_query_param(mut self, key: &str, value: impl ToString) -> Self {
        self.request
            .query
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
        self
    }

    /// Builds and validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if validation fails.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        self.request.verify()?;
        Ok(self.request)
    }
}
