//! Response envelope decoding.
//!
//! Every read answers with the same envelope:
//!
//! ```json
//! { "success": true, "data": { "id": 1, "name": "Ada" } }
//! ```
//!
//! List responses additionally carry a cursor:
//!
//! ```json
//! {
//!   "success": true,
//!   "data": [ { "id": 1 }, { "id": 2 } ],
//!   "additional_data": {
//!     "pagination": { "more_items_in_collection": true, "next_start": 2 }
//!   }
//! }
//! ```
//!
//! A body without `success` or without `data` violates the protocol;
//! `success=false` is a remote failure.

use serde_json::Value;

use crate::rest::errors::{ResourceError, DEFAULT_REMOTE_ERROR};

/// One page of a collection query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// The raw items, in server order.
    pub items: Vec<Value>,
    /// Whether the server has more items after this page.
    pub more_items: bool,
    /// The cursor of the next page, present whenever `more_items` is set.
    pub next_start: Option<u64>,
}

impl Page {
    /// A page with no items and no continuation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            more_items: false,
            next_start: None,
        }
    }
}

/// Decodes a read envelope and returns its `data` member (possibly null).
///
/// # Errors
///
/// - [`ResourceError::Protocol`] if the body is not an object, lacks
///   `success` or `data`, or carries a `success` that is not a boolean
/// - [`ResourceError::Remote`] if `success` is false
pub fn decode(body: &Value, url: &str) -> Result<Value, ResourceError> {
    let envelope = body
        .as_object()
        .ok_or_else(|| ResourceError::protocol("response body is not a JSON object", url))?;

    let success = match envelope.get("success") {
        Some(Value::Bool(success)) => *success,
        Some(_) => return Err(ResourceError::protocol("success is not a boolean", url)),
        None => return Err(ResourceError::protocol("can't find success key", url)),
    };

    if !success {
        let message = envelope
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_REMOTE_ERROR)
            .to_string();
        return Err(ResourceError::Remote {
            message,
            url: url.to_string(),
        });
    }

    envelope
        .get("data")
        .cloned()
        .ok_or_else(|| ResourceError::protocol("can't find data object in response", url))
}

/// Decodes a list envelope into a [`Page`].
///
/// A null `data` member is an empty, final page.
///
/// # Errors
///
/// Everything [`decode`] rejects, plus [`ResourceError::Protocol`] when
/// `data` is neither an array nor null, or when the server announces more
/// items without a `next_start` cursor.
pub fn decode_page(body: &Value, url: &str) -> Result<Page, ResourceError> {
    let items = match decode(body, url)? {
        Value::Null => return Ok(Page::empty()),
        Value::Array(items) => items,
        other => {
            return Err(ResourceError::protocol(
                format!("expected a list of items, got {}", type_name(&other)),
                url,
            ))
        }
    };

    let pagination = body
        .get("additional_data")
        .and_then(|extra| extra.get("pagination"));

    let more_items = pagination
        .and_then(|p| p.get("more_items_in_collection"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let next_start = pagination
        .and_then(|p| p.get("next_start"))
        .and_then(Value::as_u64);

    if more_items && next_start.is_none() {
        return Err(ResourceError::protocol(
            "more items announced without a next_start cursor",
            url,
        ));
    }

    Ok(Page {
        items,
        more_items,
        next_start,
    })
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
