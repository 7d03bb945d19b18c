//! Error types for the Pipedrive API client.
//!
//! This module contains the configuration and validation errors raised while
//! building a [`PipedriveConfig`](crate::PipedriveConfig).
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use pipedrive_api::{ApiToken, ConfigError};
//!
//! let result = ApiToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiToken)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API token cannot be empty.
    #[error("API token cannot be empty. Please provide a valid Pipedrive API token.")]
    EmptyApiToken,

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint '{url}'. Expected an absolute URL with scheme (e.g., 'https://api.pipedrive.com/v1').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Page size is out of range.
    #[error("Invalid page size {size}. Page size must be greater than zero.")]
    InvalidPageSize {
        /// The rejected page size.
        size: u32,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
