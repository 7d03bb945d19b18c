//! HTTP client for Pipedrive API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the Pipedrive API.

use std::collections::HashMap;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiToken, PipedriveConfig};

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query parameter the API token travels in.
const TOKEN_PARAM: &str = "api_token";

/// HTTP client for making requests to the Pipedrive API.
///
/// The client handles:
/// - URL construction from the configured endpoint
/// - Default headers including User-Agent
/// - Token placement as the `api_token` query parameter
/// - JSON body decoding
///
/// Failed requests are not retried.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use pipedrive_api::{PipedriveConfig, ApiToken};
/// use pipedrive_api::clients::{HttpClient, HttpRequest};
///
/// let config = PipedriveConfig::builder()
///     .api_token(ApiToken::new("token").unwrap())
///     .build()
///     .unwrap();
///
/// let client = HttpClient::new(&config)?;
/// let request = HttpRequest::get("deals/1").build().unwrap();
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL (e.g., `https://api.pipedrive.com/v1`).
    base_url: String,
    /// The API token.
    api_token: ApiToken,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g., TLS initialization failure).
    pub fn new(config: &PipedriveConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Pipedrive API Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: config.endpoint().as_ref().to_string(),
            api_token: config.api_token().clone(),
            default_headers,
        })
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the Pipedrive API.
    ///
    /// Non-2xx responses are returned as `Ok` so callers can decode the
    /// response envelope; use [`HttpClient::request_ok`] to reject them.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if request validation fails (`InvalidRequest`)
    /// or a network error occurs (`Network`).
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Put => self.client.put(&url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }

        req_builder = req_builder
            .query(&request.query)
            .query(&[(TOKEN_PARAM, self.api_token.as_ref())]);

        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let resolved_url = redact_token(res.url());
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text).unwrap_or_else(|_| {
                if code >= 500 {
                    serde_json::json!({ "raw_body": body_text })
                } else {
                    serde_json::json!({})
                }
            })
        };

        tracing::debug!(
            method = %request.http_method,
            url = %resolved_url,
            status = code,
            "Pipedrive request completed"
        );

        let response = HttpResponse::new(code, res_headers, body, resolved_url);

        if let Some(limit) = response.rate_limit {
            if limit.remaining == 0 {
                tracing::warn!(
                    "Pipedrive rate limit exhausted ({} requests per window)",
                    limit.limit
                );
            }
        }

        Ok(response)
    }

    /// Sends an HTTP request and rejects non-2xx responses.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Response`] for non-2xx status codes, in addition
    /// to the errors of [`HttpClient::request`].
    pub async fn request_ok(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self.request(request).await?;
        if response.is_ok() {
            return Ok(response);
        }

        Err(HttpError::Response(HttpResponseError {
            code: response.code,
            message: Self::serialize_error(&response),
            error_reference: response.request_id().map(String::from),
        }))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Serializes the error fields of a response body to JSON.
    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for field in ["error", "error_info", "errors", "raw_body"] {
            if let Some(value) = response.body.get(field) {
                error_body.insert(field.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Returns the URL as a string with the token query parameter removed.
fn redact_token(url: &reqwest::Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut clean = url.clone();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
