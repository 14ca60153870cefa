//! Shared test plumbing: a scripted transport and response builders.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use buyer_intake::api::Transport;
use buyer_intake::config::BoardsConfig;
use buyer_intake::error::RemoteError;
use buyer_intake::CatalogClient;

/// One recorded round trip.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub variables: Value,
}

#[derive(Default)]
struct Inner {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Transport scripted per GraphQL operation name. Responses queue up per
/// operation and are consumed in order; an unscripted call panics so a
/// test can never silently hit the network path it forgot about.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, operation: &str, data: Value) -> &Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(Ok(data));
        self
    }

    pub fn fail(&self, operation: &str, message: &str) -> &Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, RemoteError> {
        let operation = operation_name(query);
        self.inner.calls.lock().unwrap().push(RecordedCall {
            operation: operation.clone(),
            variables,
        });

        let scripted = self
            .inner
            .responses
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Ok(data)) => Ok(data),
            Some(Err(message)) => Err(RemoteError::Api(message)),
            None => panic!("unscripted call to operation {operation}"),
        }
    }
}

fn operation_name(query: &str) -> String {
    query
        .split_whitespace()
        .nth(1)
        .unwrap_or("")
        .trim_end_matches('(')
        .to_string()
}

pub fn client(transport: &MockTransport) -> CatalogClient<MockTransport> {
    CatalogClient::new(transport.clone(), BoardsConfig::default())
}

/// Opt into log output for a test run (`RUST_LOG=debug cargo test`).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---- response builders ----------------------------------------------------

fn raw_items(items: &[(u64, &str)]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|(id, name)| json!({ "id": id.to_string(), "name": name }))
            .collect(),
    )
}

/// `BoardPage` response: first page of a board listing.
pub fn board_page(cursor: Option<&str>, items: &[(u64, &str)]) -> Value {
    json!({ "boards": [{ "items_page": { "cursor": cursor, "items": raw_items(items) } }] })
}

/// `NextPage` response: a follow-up page.
pub fn next_page(cursor: Option<&str>, items: &[(u64, &str)]) -> Value {
    json!({ "next_items_page": { "cursor": cursor, "items": raw_items(items) } })
}

/// `LinkedIds` response: one item's relation columns, pre-parsed encoding.
pub fn linked_ids(columns: &[(&str, &[u64])]) -> Value {
    let column_values: Vec<Value> = columns
        .iter()
        .map(|(column, ids)| {
            json!({
                "id": column,
                "linked_item_ids": ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "items": [{ "column_values": column_values }] })
}

/// `ItemNames` response.
pub fn item_names(items: &[(u64, &str)]) -> Value {
    json!({ "items": raw_items(items) })
}

/// `ItemLabels` response: names plus the label text column (None → null).
pub fn item_labels(items: &[(u64, &str, Option<&str>)]) -> Value {
    let entries: Vec<Value> = items
        .iter()
        .map(|(id, name, text)| {
            json!({
                "id": id.to_string(),
                "name": name,
                "column_values": [{ "text": text }],
            })
        })
        .collect();
    json!({ "items": entries })
}

/// `FindByColumn` response.
pub fn found(id: Option<u64>) -> Value {
    let items = match id {
        Some(id) => vec![json!({ "id": id.to_string() })],
        None => vec![],
    };
    json!({ "items_page_by_column_values": { "items": items } })
}

/// `CreateItem` response.
pub fn created(id: u64) -> Value {
    json!({ "create_item": { "id": id.to_string() } })
}
