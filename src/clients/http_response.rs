//! HTTP response types for the Pipedrive API client.

use std::collections::HashMap;

/// Rate limit information parsed from the `X-RateLimit-*` headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// The number of requests allowed in the current window.
    pub limit: u32,
    /// The number of requests left in the current window.
    pub remaining: u32,
}

impl RateLimit {
    /// Builds rate limit info from the raw header values.
    ///
    /// Returns `None` if either value is missing or not a number.
    #[must_use]
    pub fn parse(limit: Option<&str>, remaining: Option<&str>) -> Option<Self> {
        Some(Self {
            limit: limit?.trim().parse().ok()?,
            remaining: remaining?.trim().parse().ok()?,
        })
    }
}

/// An HTTP response from the Pipedrive API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// The resolved request URL, without credentials.
    pub url: String,
    /// Rate limit information, if the remote reported it.
    pub rate_limit: Option<RateLimit>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing rate limit headers.
    #[must_use]
    pub fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
        url: impl Into<String>,
    ) -> Self {
        let first = |name: &str| {
            headers
                .get(name)
                .and_then(|values| values.first())
                .map(String::as_str)
        };
        let rate_limit = RateLimit::parse(first("x-ratelimit-limit"), first("x-ratelimit-remaining"));

        Self {
            code,
            headers,
            body,
            url: url.into(),
            rate_limit,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
