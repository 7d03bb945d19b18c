//! Cursor-based pagination over collection queries.
//!
//! A [`ResultSet`] fetches its first page when opened, hands out the
//! buffered records one at a time, and fetches the next page only when the
//! buffer runs dry. Each item becomes a preloaded [`Entity`], so iterating
//! costs one request per page, not per record.
//!
//! A result set is single-pass. Once it reports the end (or a failure),
//! every later call returns `Ok(None)`; open a new one to query again.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipedrive_api::{QueryParams, ResourceKind};
//!
//! let mut filters = QueryParams::new();
//! filters.insert("status".to_string(), "open".to_string());
//!
//! let mut deals = client.list(ResourceKind::Deal, filters).await?;
//! while let Some(mut deal) = deals.next().await? {
//!     println!("{} {:?}", deal.id(), deal.get_value("title").await?);
//! }
//! ```

use std::collections::VecDeque;

use serde_json::Value;

use crate::rest::{Entity, PipedriveClient, ResourceError, ResourceKind};
use crate::transport::QueryParams;

/// A lazy, finite, single-pass sequence of records.
#[derive(Debug)]
pub struct ResultSet {
    client: PipedriveClient,
    kind: ResourceKind,
    path: String,
    params: QueryParams,
    buffer: VecDeque<Entity>,
    next_start: u64,
    has_more: bool,
    pages_fetched: usize,
}

impl ResultSet {
    /// Opens a result set over `path` and fetches its first page.
    ///
    /// # Errors
    ///
    /// Any error of fetching or decoding the first page.
    pub async fn open(
        client: PipedriveClient,
        kind: ResourceKind,
        path: impl Into<String> + Send,
        params: QueryParams,
    ) -> Result<Self, ResourceError> {
        let mut result_set = Self {
            client,
            kind,
            path: path.into(),
            params,
            buffer: VecDeque::new(),
            next_start: 0,
            has_more: true,
            pages_fetched: 0,
        };
        result_set.fetch_page().await?;
        Ok(result_set)
    }

    /// Returns the next record, fetching a page when the buffer is empty.
    ///
    /// # Errors
    ///
    /// Any error of fetching or decoding a page. The result set is
    /// finished afterwards.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<Option<Entity>, ResourceError> {
        loop {
            if let Some(entity) = self.buffer.pop_front() {
                return Ok(Some(entity));
            }
            if !self.has_more {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    /// Drains the remaining records into a vector.
    ///
    /// # Errors
    ///
    /// The first page error encountered.
    pub async fn collect_all(mut self) -> Result<Vec<Entity>, ResourceError> {
        let mut entities = Vec::with_capacity(self.buffer.len());
        while let Some(entity) = self.next().await? {
            entities.push(entity);
        }
        Ok(entities)
    }

    /// The kind of the records.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The collection path queried.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The filter parameters sent with every page request.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Whether the server reported more pages.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// The number of records fetched but not yet handed out.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The number of page requests made so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn fetch_page(&mut self) -> Result<(), ResourceError> {
        let result = self.load_page().await;
        if result.is_err() {
            self.has_more = false;
            self.buffer.clear();
        }
        result
    }

    async fn load_page(&mut self) -> Result<(), ResourceError> {
        let start = self.next_start;
        let page = self
            .client
            .transport()
            .list(&self.path, &self.params, start)
            .await?;
        self.pages_fetched += 1;

        tracing::debug!(
            "Fetched {} {} item(s) from {} at cursor {}",
            page.items.len(),
            self.kind,
            self.path,
            start
        );

        let item_count = page.items.len();
        for item in page.items {
            let entity = self.materialize(item)?;
            self.buffer.push_back(entity);
        }

        self.has_more = page.more_items;
        self.next_start = page.next_start.unwrap_or(start + item_count as u64);

        if self.has_more && self.next_start <= start {
            return Err(ResourceError::protocol(
                format!("pagination cursor did not advance past {start}"),
                &self.path,
            ));
        }
        Ok(())
    }

    fn materialize(&self, item: Value) -> Result<Entity, ResourceError> {
        let Value::Object(data) = item else {
            return Err(ResourceError::protocol(
                format!("expected a {} object in the list", self.kind),
                &self.path,
            ));
        };
        let id = data
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                ResourceError::protocol(
                    format!("{} item without an integer id", self.kind),
                    &self.path,
                )
            })?;
        Ok(self.client.entity_with_preload(self.kind, id, data))
    }
}

