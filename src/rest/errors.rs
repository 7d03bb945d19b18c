//! Resource-level error types.
//!
//! Every failure the object model can report surfaces as a
//! [`ResourceError`]. The core never recovers from any of them locally; the
//! only self-healing behavior is the single forced refetch an
//! [`Entity`](crate::rest::Entity) performs on a read miss before it reports
//! [`ResourceError::NotFound`].
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::rest::ResourceError;
//!
//! match deal.get("lead_score").await {
//!     Ok(value) => println!("score: {value:?}"),
//!     Err(ResourceError::NotFound { name, .. }) => println!("no field {name}"),
//!     Err(ResourceError::Remote { message, .. }) => println!("remote said: {message}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::HttpError;

/// Message used when the remote reports failure without an explanation.
pub const DEFAULT_REMOTE_ERROR: &str = "no error message given";

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The response envelope did not have the expected shape.
    #[error("Bad response from {url}: {reason}")]
    Protocol {
        /// What was wrong with the response.
        reason: String,
        /// The resolved request URL.
        url: String,
    },

    /// The response envelope reported `success=false`.
    #[error("Pipedrive error - {message} at {url}")]
    Remote {
        /// The remote's error message.
        message: String,
        /// The resolved request URL.
        url: String,
    },

    /// A named attribute was absent even after a forced refresh.
    #[error("Can't get property: {name} not found on {resource} {id}")]
    NotFound {
        /// The resource kind (e.g., "deal").
        resource: &'static str,
        /// The record id.
        id: u64,
        /// The requested attribute name.
        name: String,
    },

    /// The record is deleted or inactive on the remote.
    #[error("Can't {operation} {resource} {id}: record is inactive or deleted")]
    InvalidState {
        /// The resource kind.
        resource: &'static str,
        /// The record id.
        id: u64,
        /// The attempted operation (e.g., "save").
        operation: &'static str,
    },

    /// The operation is not available for this resource kind.
    #[error("Operation '{operation}' is not supported for {resource}")]
    Unsupported {
        /// The resource kind.
        resource: &'static str,
        /// The unsupported operation.
        operation: String,
    },

    /// An HTTP-level error occurred (network failure or non-2xx write).
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Creates a [`ResourceError::Protocol`].
    pub fn protocol(reason: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
            url: url.into(),
        }
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Http(HttpError::Response(e)) => e.error_reference.as_deref(),
            _ => None,
        }
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
