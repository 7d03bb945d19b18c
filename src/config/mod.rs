//! Configuration types for the Pipedrive API client.
//!
//! # Overview
//!
//! - [`PipedriveConfig`]: The configuration struct holding all client settings
//! - [`PipedriveConfigBuilder`]: A builder for constructing [`PipedriveConfig`] instances
//! - [`ApiToken`]: A validated API token newtype with masked debug output
//! - [`Endpoint`]: A validated API base URL
//!
//! # Example
//!
//! ```rust
//! use pipedrive_api::{PipedriveConfig, ApiToken};
//!
//! let config = PipedriveConfig::builder()
//!     .api_token(ApiToken::new("my-token").unwrap())
//!     .page_size(200)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_size(), Some(200));
//! ```

mod newtypes;

pub use newtypes::{ApiToken, Endpoint, DEFAULT_ENDPOINT};

use crate::error::ConfigError;

/// Configuration for the Pipedrive API client.
///
/// `PipedriveConfig` is `Clone`, `Send`, and `Sync`; build it once at client
/// setup and pass it explicitly.
#[derive(Clone, Debug)]
pub struct PipedriveConfig {
    api_token: ApiToken,
    endpoint: Endpoint,
    user_agent_prefix: Option<String>,
    page_size: Option<u32>,
}

impl PipedriveConfig {
    /// Creates a new builder for constructing a `PipedriveConfig`.
    #[must_use]
    pub fn builder() -> PipedriveConfigBuilder {
        PipedriveConfigBuilder::new()
    }

    /// Returns the API token.
    #[must_use]
    pub const fn api_token(&self) -> &ApiToken {
        &self.api_token
    }

    /// Returns the API endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the page size sent as `limit` on list requests, if configured.
    ///
    /// When unset the remote's own default page size applies.
    #[must_use]
    pub const fn page_size(&self) -> Option<u32> {
        self.page_size
    }
}

// Verify PipedriveConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PipedriveConfig>();
};

/// Builder for constructing [`PipedriveConfig`] instances.
///
/// `api_token` is required. Defaults:
///
/// - `endpoint`: [`DEFAULT_ENDPOINT`]
/// - `user_agent_prefix`: `None`
/// - `page_size`: `None`
#[derive(Debug, Default)]
pub struct PipedriveConfigBuilder {
    api_token: Option<ApiToken>,
    endpoint: Option<Endpoint>,
    user_agent_prefix: Option<String>,
    page_size: Option<u32>,
}

impl PipedriveConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token (required).
    #[must_use]
    pub fn api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the number of items requested per page.
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Builds the [`PipedriveConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_token` is not set,
    /// or [`ConfigError::InvalidPageSize`] if the page size is zero.
    pub fn build(self) -> Result<PipedriveConfig, ConfigError> {
        let api_token = self
            .api_token
            .ok_or(ConfigError::MissingRequiredField { field: "api_token" })?;

        if let Some(size @ 0) = self.page_size {
            return Err(ConfigError::InvalidPageSize { size });
        }

        Ok(PipedriveConfig {
            api_token,
            endpoint: self.endpoint.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
            page_size: self.page_size,
        })
    }
}
