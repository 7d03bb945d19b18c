//! Attribute values returned by [`Entity::get`](crate::rest::Entity::get).
//!
//! Fields whose type tag names another resource kind hold a foreign key.
//! Such values come back as a [`FieldValue::Reference`] instead of raw JSON;
//! the nested [`Entity`] is only built when the caller asks for it.

use serde_json::{Map, Value};

use crate::rest::{Entity, PipedriveClient, ResourceError, ResourceKind};

/// A value read from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A plain value, returned unchanged.
    Value(Value),
    /// A foreign key into another resource kind.
    Reference(EntityRef),
}

impl FieldValue {
    /// Returns the plain value, if this is not a reference.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Reference(_) => None,
        }
    }

    /// Returns the reference, if this is one.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&EntityRef> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Value(_) => None,
        }
    }

    /// Whether this is a reference.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// What is known locally about a referenced record.
#[derive(Debug, Clone, PartialEq)]
pub enum RefTarget {
    /// Only the id; the nested entity starts with an empty cache.
    Unresolved {
        /// The referenced record's id.
        id: u64,
    },
    /// The remote embedded a summary of the record; it becomes the nested
    /// entity's cache.
    Resolved {
        /// The referenced record's id.
        id: u64,
        /// The embedded fields.
        preload: Map<String, Value>,
    },
}

/// A reference to a record of another kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    kind: ResourceKind,
    target: RefTarget,
}

impl EntityRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub const fn new(kind: ResourceKind, target: RefTarget) -> Self {
        Self { kind, target }
    }

    /// Interprets a raw foreign-key value.
    ///
    /// - a bare integer or numeric string is an unresolved id
    /// - `{"value": id}` is an unresolved id
    /// - an object with further members is resolved, its id taken from
    ///   `value`, falling back to `id`
    ///
    /// Returns `Ok(None)` for null.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Protocol`] if no id can be read.
    pub fn from_raw(
        kind: ResourceKind,
        raw: &Value,
        url: &str,
    ) -> Result<Option<Self>, ResourceError> {
        let target = match raw {
            Value::Null => return Ok(None),
            Value::Object(object) => {
                let id = object
                    .get("value")
                    .and_then(parse_id)
                    .or_else(|| object.get("id").and_then(parse_id))
                    .ok_or_else(|| bad_id(kind, raw, url))?;
                if object.len() == 1 && object.contains_key("value") {
                    RefTarget::Unresolved { id }
                } else {
                    RefTarget::Resolved {
                        id,
                        preload: object.clone(),
                    }
                }
            }
            other => RefTarget::Unresolved {
                id: parse_id(other).ok_or_else(|| bad_id(kind, raw, url))?,
            },
        };
        Ok(Some(Self { kind, target }))
    }

    /// The referenced kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The referenced record's id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match &self.target {
            RefTarget::Unresolved { id } | RefTarget::Resolved { id, .. } => *id,
        }
    }

    /// The local knowledge about the record.
    #[must_use]
    pub const fn target(&self) -> &RefTarget {
        &self.target
    }

    /// Whether a preload is available.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.target, RefTarget::Resolved { .. })
    }

    /// Builds the nested entity. No request is made.
    #[must_use]
    pub fn resolve(&self, client: &PipedriveClient) -> Entity {
        match &self.target {
            RefTarget::Unresolved { id } => client.entity(self.kind, *id),
            RefTarget::Resolved { id, preload } => {
                client.entity_with_preload(self.kind, *id, preload.clone())
            }
        }
    }
}

/// Reads a record id from a JSON number or numeric string.
pub(crate) fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bad_id(kind: ResourceKind, raw: &Value, url: &str) -> ResourceError {
    ResourceError::protocol(format!("can't read a {kind} id from {raw}"), url)
}
