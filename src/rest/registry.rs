//! Field-name registry for custom fields.
//!
//! Custom fields are stored remotely under generated 40-character hash keys.
//! The registry maps those keys to readable names derived from the field
//! label (and back), and remembers each key's type tag and editability.
//! Built-in fields keep their key as their name.
//!
//! A schema is loaded at most once per resource kind and shared read-only
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use pipedrive_api::rest::{FieldDefinition, FieldSchema};
//!
//! let defs = vec![
//!     FieldDefinition::new("name", "Name", "varchar"),
//!     FieldDefinition::new("a".repeat(40), "Lead Score", "double"),
//! ];
//! let schema = FieldSchema::from_definitions(defs);
//!
//! assert_eq!(schema.key_for("lead_score"), Some("a".repeat(40).as_str()));
//! assert_eq!(schema.key_for("name"), Some("name"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::{ResourceError, ResourceKind};
use crate::transport::Transport;

/// Length of the generated keys custom fields are stored under.
pub const CUSTOM_FIELD_KEY_LEN: usize = 40;

/// A field definition as returned by the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// The remote key the value is stored under.
    pub key: String,
    /// The human-readable label.
    #[serde(default)]
    pub name: String,
    /// The type tag (e.g., "varchar", "double", "people").
    pub field_type: String,
    /// Whether the field can be written.
    #[serde(default = "default_edit_flag")]
    pub edit_flag: bool,
    /// Choices of enumerated fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
}

const fn default_edit_flag() -> bool {
    true
}

impl FieldDefinition {
    /// Creates an editable definition without options.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            field_type: field_type.into(),
            edit_flag: true,
            options: None,
        }
    }

    /// Whether the key is a generated custom-field key.
    ///
    /// Only the key length is checked; the remote documents nothing better.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.key.len() == CUSTOM_FIELD_KEY_LEN
    }
}

/// Type and editability metadata of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// The type tag.
    pub field_type: String,
    /// Whether the field can be written.
    pub editable: bool,
    /// Choices of enumerated fields.
    pub options: Option<Vec<Value>>,
}

/// The loaded field mapping of one resource kind.
///
/// `name_to_key` and `key_to_name` are mutual inverses, and every key with
/// a config has a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    key_to_name: HashMap<String, String>,
    name_to_key: HashMap<String, String>,
    field_config: HashMap<String, FieldConfig>,
}

impl FieldSchema {
    /// Builds a schema from the remote's field definitions.
    ///
    /// Custom fields are named after their normalized label. When that name
    /// is empty or already taken, the raw key is used instead so the
    /// mapping stays invertible.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = FieldDefinition>) -> Self {
        let mut schema = Self::default();

        for def in definitions {
            if let Some(old_name) = schema.key_to_name.remove(&def.key) {
                schema.name_to_key.remove(&old_name);
            }

            let mut name = def.key.clone();
            if def.is_custom() {
                let label = to_snake_case(&def.name);
                if label.is_empty() || schema.name_to_key.contains_key(&label) {
                    tracing::warn!(
                        "Field name {:?} for key {} is empty or taken, using the key",
                        label,
                        def.key
                    );
                } else {
                    name = label;
                }
            }
            if let Some(displaced) = schema.name_to_key.remove(&name) {
                // A built-in key equal to an earlier custom name wins its own name.
                schema.key_to_name.insert(displaced.clone(), displaced.clone());
                schema.name_to_key.insert(displaced.clone(), displaced);
            }

            schema.key_to_name.insert(def.key.clone(), name.clone());
            schema.name_to_key.insert(name, def.key.clone());
            schema.field_config.insert(
                def.key,
                FieldConfig {
                    field_type: def.field_type,
                    editable: def.edit_flag,
                    options: def.options,
                },
            );
        }

        schema
    }

    /// Resolves a field name to its remote key.
    #[must_use]
    pub fn key_for(&self, name: &str) -> Option<&str> {
        self.name_to_key.get(name).map(String::as_str)
    }

    /// Resolves a remote key to its field name.
    #[must_use]
    pub fn name_for(&self, key: &str) -> Option<&str> {
        self.key_to_name.get(key).map(String::as_str)
    }

    /// Returns the metadata of a remote key.
    #[must_use]
    pub fn config(&self, key: &str) -> Option<&FieldConfig> {
        self.field_config.get(key)
    }

    /// Returns whether the named field can be written.
    #[must_use]
    pub fn is_editable(&self, name: &str) -> bool {
        self.key_for(name)
            .and_then(|key| self.config(key))
            .is_some_and(|config| config.editable)
    }

    /// Iterates over all field names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name_to_key.keys().map(String::as_str)
    }

    /// The number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_to_name.len()
    }

    /// Whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_to_name.is_empty()
    }
}

/// Normalizes a field label into a snake-case name.
///
/// Letters are lowercased, camel-case humps are split, and every run of
/// other characters becomes a single `_`.
///
/// ```rust
/// use pipedrive_api::rest::to_snake_case;
///
/// assert_eq!(to_snake_case("Lead Score"), "lead_score");
/// assert_eq!(to_snake_case("nextActivityDate"), "next_activity_date");
/// assert_eq!(to_snake_case("  Budget (EUR) "), "budget_eur");
/// ```
#[must_use]
pub fn to_snake_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_lower_or_digit = false;
    let mut pending_sep = false;

    for c in label.chars() {
        if c.is_alphanumeric() {
            if (pending_sep || (c.is_uppercase() && prev_lower_or_digit)) && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            prev_lower_or_digit = c.is_lowercase() || c.is_numeric();
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
            prev_lower_or_digit = false;
        }
    }

    out
}

/// Process-wide cache of field schemas, keyed by resource kind.
///
/// Create one per client and share it; loading a kind is guarded by a
/// per-kind lock so concurrent first accesses issue a single request.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    schemas: RwLock<HashMap<ResourceKind, Arc<FieldSchema>>>,
    load_locks: Mutex<HashMap<ResourceKind, Arc<tokio::sync::Mutex<()>>>>,
}

// Verify FieldRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FieldRegistry>();
};

impl FieldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema of a kind, if loaded.
    #[must_use]
    pub fn schema(&self, kind: ResourceKind) -> Option<Arc<FieldSchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }

    /// Whether the schema of a kind is cached.
    #[must_use]
    pub fn is_loaded(&self, kind: ResourceKind) -> bool {
        self.schema(kind).is_some()
    }

    /// Loads the schema of a kind unless already cached.
    ///
    /// Kinds without custom fields have no schema; `Ok(None)` is returned
    /// and no request is made.
    ///
    /// # Errors
    ///
    /// Propagates transport errors, including [`ResourceError::Protocol`]
    /// for a malformed field list. Nothing is cached on failure.
    pub async fn load(
        &self,
        kind: ResourceKind,
        transport: &dyn Transport,
    ) -> Result<Option<Arc<FieldSchema>>, ResourceError> {
        if !kind.has_custom_fields() {
            return Ok(None);
        }
        if let Some(schema) = self.schema(kind) {
            return Ok(Some(schema));
        }

        let lock = Arc::clone(
            self.load_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(kind)
                .or_default(),
        );
        let _guard = lock.lock().await;

        // Another task may have finished the load while we waited.
        if let Some(schema) = self.schema(kind) {
            return Ok(Some(schema));
        }

        tracing::debug!("Loading fields for resource {}", kind);
        let definitions = transport.load_field_defs(&kind.field_segment()).await?;
        let schema = Arc::new(FieldSchema::from_definitions(definitions));

        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, Arc::clone(&schema));

        Ok(Some(schema))
    }
}
