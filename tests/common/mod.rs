//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pipedrive_api::rest::Page;
use pipedrive_api::{
    FieldDefinition, FieldRegistry, PipedriveClient, QueryParams, ResourceError, Transport,
};
use serde_json::{json, Map, Value};

pub const BASE_URL: &str = "https://api.pipedrive.com/v1";

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch {
        segment: String,
        id: Option<u64>,
    },
    List {
        path: String,
        params: QueryParams,
        start: u64,
    },
    Update {
        segment: String,
        id: u64,
        fields: Map<String, Value>,
    },
    LoadFieldDefs {
        segment: String,
    },
    Merge {
        segment: String,
        id: u64,
        target_id: u64,
    },
}

/// Transport answering from scripted records, pages and field lists.
#[derive(Default)]
pub struct MockTransport {
    records: Mutex<HashMap<(String, u64), Value>>,
    pages: Mutex<HashMap<(String, u64), Result<Page, String>>>,
    field_defs: Mutex<HashMap<String, Vec<Value>>>,
    fail_updates: Mutex<Option<String>>,
    field_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every field-definition load, to widen race windows.
    pub fn with_field_delay(mut self, delay: Duration) -> Self {
        self.field_delay = Some(delay);
        self
    }

    pub fn set_record(&self, segment: &str, id: u64, data: Value) {
        self.records
            .lock()
            .unwrap()
            .insert((segment.to_string(), id), data);
    }

    pub fn set_page(&self, path: &str, start: u64, page: Page) {
        self.pages
            .lock()
            .unwrap()
            .insert((path.to_string(), start), Ok(page));
    }

    pub fn set_page_error(&self, path: &str, start: u64, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert((path.to_string(), start), Err(message.to_string()));
    }

    pub fn set_field_defs(&self, field_segment: &str, defs: Vec<Value>) {
        self.field_defs
            .lock()
            .unwrap()
            .insert(field_segment.to_string(), defs);
    }

    pub fn fail_updates(&self, message: Option<&str>) {
        *self.fail_updates.lock().unwrap() = message.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn url(path: &str) -> String {
        format!("{BASE_URL}/{path}")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, segment: &str, id: Option<u64>) -> Result<(Value, String), ResourceError> {
        self.record(Call::Fetch {
            segment: segment.to_string(),
            id,
        });
        let path = id.map_or(segment.to_string(), |id| format!("{segment}/{id}"));
        let record = id.and_then(|id| {
            self.records
                .lock()
                .unwrap()
                .get(&(segment.to_string(), id))
                .cloned()
        });
        match record {
            Some(data) => Ok((data, Self::url(&path))),
            None => Err(ResourceError::Remote {
                message: "Item not found".to_string(),
                url: Self::url(&path),
            }),
        }
    }

    async fn list(
        &self,
        path: &str,
        params: &QueryParams,
        start: u64,
    ) -> Result<Page, ResourceError> {
        self.record(Call::List {
            path: path.to_string(),
            params: params.clone(),
            start,
        });
        let page = self
            .pages
            .lock()
            .unwrap()
            .get(&(path.to_string(), start))
            .cloned();
        match page {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(ResourceError::Remote {
                message,
                url: Self::url(path),
            }),
            None => Ok(Page::empty()),
        }
    }

    async fn update(
        &self,
        segment: &str,
        id: u64,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, ResourceError> {
        self.record(Call::Update {
            segment: segment.to_string(),
            id,
            fields: fields.clone(),
        });
        let failure = self.fail_updates.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(ResourceError::Remote {
                message,
                url: Self::url(&format!("{segment}/{id}")),
            });
        }
        Ok(Some(Value::Object(fields)))
    }

    async fn load_field_defs(
        &self,
        field_segment: &str,
    ) -> Result<Vec<FieldDefinition>, ResourceError> {
        self.record(Call::LoadFieldDefs {
            segment: field_segment.to_string(),
        });
        if let Some(delay) = self.field_delay {
            tokio::time::sleep(delay).await;
        }
        let defs = self
            .field_defs
            .lock()
            .unwrap()
            .get(field_segment)
            .cloned()
            .unwrap_or_default();
        defs.into_iter()
            .map(|def| {
                serde_json::from_value(def).map_err(|e| {
                    ResourceError::protocol(e.to_string(), Self::url(field_segment))
                })
            })
            .collect()
    }

    async fn merge(
        &self,
        segment: &str,
        id: u64,
        target_id: u64,
    ) -> Result<Option<Value>, ResourceError> {
        self.record(Call::Merge {
            segment: segment.to_string(),
            id,
            target_id,
        });
        Ok(Some(json!({ "id": target_id })))
    }
}

/// Builds a client over the given mock with a fresh registry.
pub fn client_with(mock: &Arc<MockTransport>) -> PipedriveClient {
    PipedriveClient::with_transport(
        Arc::clone(mock) as Arc<dyn Transport>,
        Arc::new(FieldRegistry::new()),
    )
}

/// A 40-character custom-field key made of `c`.
pub fn custom_key(c: char) -> String {
    std::iter::repeat(c).take(40).collect()
}

/// Builds `count` list items with ids starting at `first_id`.
pub fn items(first_id: u64, count: u64) -> Vec<Value> {
    (first_id..first_id + count)
        .map(|id| json!({ "id": id, "name": format!("Item {id}") }))
        .collect()
}

pub fn page(items: Vec<Value>, next_start: Option<u64>) -> Page {
    Page {
        items,
        more_items: next_start.is_some(),
        next_start,
    }
}

/// The deal field list used across tests.
pub fn deal_fields() -> Vec<Value> {
    vec![
        json!({"key": "id", "name": "ID", "field_type": "int", "edit_flag": false}),
        json!({"key": "title", "name": "Title", "field_type": "varchar", "edit_flag": true}),
        json!({"key": "value", "name": "Value", "field_type": "monetary"}),
        json!({"key": "person_id", "name": "Contact person", "field_type": "people"}),
        json!({"key": "org_id", "name": "Organization", "field_type": "org"}),
        json!({"key": "owner", "name": "Owner", "field_type": "people"}),
        json!({"key": custom_key('a'), "name": "Lead Score", "field_type": "double"}),
        json!({"key": custom_key('b'), "name": "Region", "field_type": "varchar"}),
    ]
}
