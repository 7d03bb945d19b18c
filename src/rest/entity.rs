//! The record facade.
//!
//! An [`Entity`] stands for one remote record. It keeps the record's raw
//! fields in a local cache, tracks which fields were changed locally, and
//! writes only those fields back on [`Entity::save`].
//!
//! # Cache lifecycle
//!
//! - Built by id only, the cache is empty and the first read fetches the
//!   record.
//! - Built from a list or search result, the cache is preloaded and reads
//!   are free until a miss.
//! - A read miss triggers exactly one forced refetch before
//!   [`ResourceError::NotFound`] is reported.
//! - A successful save or merge empties the cache, so the next read returns
//!   the server's canonical state.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::{PipedriveClient, ResourceKind};
//! use serde_json::json;
//!
//! let mut deal = client.entity(ResourceKind::Deal, 42);
//!
//! let title = deal.get_value("title").await?;
//! if deal.set("lead_score", json!(80)).await? {
//!     deal.save().await?;
//! }
//!
//! let mut products = deal.relation("products", Default::default()).await?;
//! while let Some(product) = products.next().await? {
//!     println!("{}", product.id());
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::rest::path::build_path;
use crate::rest::registry::FieldSchema;
use crate::rest::{
    EntityRef, FieldValue, PipedriveClient, Relation, ResourceError, ResourceKind, ResultSet,
};
use crate::transport::QueryParams;

const ACTIVE_FLAG: &str = "active_flag";

/// Client-side facade for one remote record.
///
/// Not meant to be shared between tasks; every operation takes `&mut self`
/// or `&self` and completes its requests before returning.
pub struct Entity {
    client: PipedriveClient,
    kind: ResourceKind,
    id: u64,
    data: Map<String, Value>,
    dirty: BTreeSet<String>,
    url: Option<String>,
}

impl Entity {
    /// Creates an entity with an empty cache.
    #[must_use]
    pub fn new(client: PipedriveClient, kind: ResourceKind, id: u64) -> Self {
        Self::with_preload(client, kind, id, Map::new())
    }

    /// Creates an entity whose cache holds `data`.
    #[must_use]
    pub fn with_preload(
        client: PipedriveClient,
        kind: ResourceKind,
        id: u64,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            client,
            kind,
            id,
            data,
            dirty: BTreeSet::new(),
            url: None,
        }
    }

    /// The record id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The resolved URL of the last fetch, if any happened.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the cache holds any data.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Names of the fields changed since the last save, sorted.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// The raw cached fields, keyed by remote key.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The client this entity issues its requests through.
    #[must_use]
    pub const fn client(&self) -> &PipedriveClient {
        &self.client
    }

    /// The relations declared on this entity's kind.
    #[must_use]
    pub const fn relations(&self) -> &'static [Relation] {
        self.kind.relations()
    }

    /// Reads a field, routing foreign keys into [`FieldValue::Reference`].
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the field is absent after a refetch
    /// - [`ResourceError::Protocol`] if a foreign key holds no readable id
    /// - any transport error of the schema load or the fetch
    pub async fn get(&mut self, name: &str) -> Result<FieldValue, ResourceError> {
        let schema = self.schema().await?;
        let key = resolve_key(schema.as_deref(), name);
        let raw = self.lookup(name, &key).await?;

        let target_kind = schema
            .as_deref()
            .and_then(|s| s.config(&key))
            .and_then(|config| ResourceKind::from_field_type(&config.field_type));

        let Some(target_kind) = target_kind else {
            return Ok(FieldValue::Value(raw));
        };

        let url = self.url.clone().unwrap_or_else(|| self.default_url());
        Ok(EntityRef::from_raw(target_kind, &raw, &url)?
            .map_or(FieldValue::Value(raw), FieldValue::Reference))
    }

    /// Reads a field's raw value without foreign-key routing.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::get`], minus the id parsing.
    pub async fn get_value(&mut self, name: &str) -> Result<Value, ResourceError> {
        let schema = self.schema().await?;
        let key = resolve_key(schema.as_deref(), name);
        self.lookup(name, &key).await
    }

    /// Changes a field locally.
    ///
    /// The change is recorded only when the new value's text differs from
    /// the cached one. Returns whether the field was changed.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the kind has no such field
    /// - [`ResourceError::InvalidState`] if the record is inactive
    /// - any transport error of the schema load or the fetch
    pub async fn set(
        &mut self,
        name: &str,
        value: impl Into<Value> + Send,
    ) -> Result<bool, ResourceError> {
        let value = value.into();
        let schema = self.schema().await?;
        self.ensure_loaded().await?;

        let key = match schema.as_deref() {
            Some(schema) => schema.key_for(name).map(str::to_string),
            None => self.data.contains_key(name).then(|| name.to_string()),
        }
        .ok_or_else(|| self.not_found(name))?;

        if !self.active() {
            return Err(self.invalid_state("set"));
        }

        if text_form(self.data.get(&key)) == text_form(Some(&value)) {
            return Ok(false);
        }

        tracing::debug!("Setting {} on {} {}", name, self.kind, self.id);
        self.data.insert(key, value);
        self.dirty.insert(name.to_string());
        Ok(true)
    }

    /// Writes the changed fields back in a single update.
    ///
    /// Nothing is sent when no field changed. On success the dirty set is
    /// cleared and the cache emptied; on failure both are left untouched.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::InvalidState`] if the record is inactive
    /// - the transport error of the update, unchanged
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        if !self.is_active().await? {
            return Err(self.invalid_state("save"));
        }

        let schema = self.schema().await?;
        let payload: Map<String, Value> = self
            .dirty
            .iter()
            .map(|name| {
                let key = resolve_key(schema.as_deref(), name);
                let value = self.data.get(&key).cloned().unwrap_or(Value::Null);
                (key, value)
            })
            .collect();

        tracing::debug!(
            "Saving {} field(s) of {} {}",
            payload.len(),
            self.kind,
            self.id
        );
        self.client
            .transport()
            .update(self.kind.segment(), self.id, payload)
            .await?;

        self.dirty.clear();
        self.data.clear();
        Ok(())
    }

    /// Merges this record into `target_id` on the remote.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Unsupported`] if the kind cannot be merged
    /// - the transport error of the merge, unchanged
    pub async fn merge(&mut self, target_id: u64) -> Result<(), ResourceError> {
        if !self.kind.supports_merge() {
            return Err(ResourceError::Unsupported {
                resource: self.kind.resource(),
                operation: "merge".to_string(),
            });
        }

        tracing::debug!("Merging {} {} into {}", self.kind, self.id, target_id);
        self.client
            .transport()
            .merge(self.kind.segment(), self.id, target_id)
            .await?;

        self.invalidate();
        Ok(())
    }

    /// Refetches the record, keeping unsaved local changes on top.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Protocol`] if the remote returns something
    /// other than an object, or the transport error of the fetch.
    pub async fn refresh(&mut self) -> Result<(), ResourceError> {
        let segment = self.kind.segment();
        tracing::debug!("Fetching {} {}", self.kind, self.id);

        let (data, url) = self.client.transport().fetch(segment, Some(self.id)).await?;
        let Value::Object(mut fresh) = data else {
            return Err(ResourceError::protocol(
                format!("expected a {} object", self.kind),
                url,
            ));
        };

        if !self.dirty.is_empty() {
            let schema = self.client.registry().schema(self.kind);
            for name in &self.dirty {
                let key = resolve_key(schema.as_deref(), name);
                if let Some(value) = self.data.get(&key) {
                    fresh.insert(key, value.clone());
                }
            }
        }

        self.data = fresh;
        self.url = Some(url);
        Ok(())
    }

    /// Discards the cache and any unsaved changes.
    pub fn invalidate(&mut self) {
        self.data.clear();
        self.dirty.clear();
    }

    /// Whether the record is active on the remote.
    ///
    /// A record without an `active_flag` counts as active.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the record has to be fetched.
    pub async fn is_active(&mut self) -> Result<bool, ResourceError> {
        self.ensure_loaded().await?;
        Ok(self.active())
    }

    /// Opens the nested collection `name` of this record.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Unsupported`] if the kind declares no such relation
    /// - any error of fetching the first page
    pub async fn relation(
        &self,
        name: &str,
        filters: QueryParams,
    ) -> Result<ResultSet, ResourceError> {
        let relation = self
            .kind
            .relation(name)
            .ok_or_else(|| ResourceError::Unsupported {
                resource: self.kind.resource(),
                operation: format!("relation '{name}'"),
            })?;

        let path = build_path(self.kind.segment(), Some(self.id), Some(relation.name));
        ResultSet::open(self.client.clone(), relation.target, path, filters).await
    }

    async fn schema(&self) -> Result<Option<Arc<FieldSchema>>, ResourceError> {
        self.client.load_fields(self.kind).await
    }

    async fn ensure_loaded(&mut self) -> Result<(), ResourceError> {
        if self.data.is_empty() {
            self.refresh().await?;
        }
        Ok(())
    }

    async fn lookup(&mut self, name: &str, key: &str) -> Result<Value, ResourceError> {
        if let Some(value) = self.data.get(key) {
            return Ok(value.clone());
        }

        self.refresh().await?;
        self.data
            .get(key)
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    fn active(&self) -> bool {
        !matches!(self.data.get(ACTIVE_FLAG), Some(Value::Bool(false)))
    }

    fn not_found(&self, name: &str) -> ResourceError {
        ResourceError::NotFound {
            resource: self.kind.resource(),
            id: self.id,
            name: name.to_string(),
        }
    }

    const fn invalid_state(&self, operation: &'static str) -> ResourceError {
        ResourceError::InvalidState {
            resource: self.kind.resource(),
            id: self.id,
            operation,
        }
    }

    fn default_url(&self) -> String {
        build_path(self.kind.segment(), Some(self.id), None)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("data", &self.data)
            .field("dirty", &self.dirty)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

fn resolve_key(schema: Option<&FieldSchema>, name: &str) -> String {
    schema
        .and_then(|s| s.key_for(name))
        .unwrap_or(name)
        .to_string()
}

/// The text a value compares by: strings unquoted, everything else as JSON.
fn text_form(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
