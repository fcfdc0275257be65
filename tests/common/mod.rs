//! In-process store double for integration tests
//!
//! `MemoryStore` answers the store wire protocol from a JSON tree held in
//! memory, so tests can run full round trips without network access.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use jsonstore::{ClientConfig, StoreClient};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const STORE_ID: &str = "test-store";

/// Client pointed at a mock server, with a short timeout
pub fn client_for(server: &MockServer) -> StoreClient {
    client_with_timeout(server, 2000)
}

pub fn client_with_timeout(server: &MockServer, timeout_ms: u64) -> StoreClient {
    StoreClient::with_config(ClientConfig {
        endpoint: server.uri(),
        store_id: STORE_ID.to_string(),
        timeout_ms,
        ..Default::default()
    })
    .expect("Failed to create client")
}

/// Request path for a key, as the client should produce it
pub fn store_path(key: &str) -> String {
    if key.is_empty() {
        format!("/{}", STORE_ID)
    } else {
        format!("/{}/{}", STORE_ID, key)
    }
}

pub fn envelope(result: Value, ok: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": result, "ok": ok }))
}

/// Start a mock server backed by a fresh `MemoryStore`
pub async fn start_store() -> (MockServer, MemoryStore) {
    let server = MockServer::start().await;
    let store = MemoryStore::default();
    Mock::given(path_regex(format!("^/{}(/.*)?$", STORE_ID)))
        .respond_with(store.clone())
        .mount(&server)
        .await;
    (server, store)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    root: Arc<Mutex<Value>>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> Value {
        self.root.lock().unwrap().clone()
    }

    pub fn lookup(&self, key: &str) -> Option<Value> {
        let segments = split(key);
        let root = self.root.lock().unwrap();
        lookup(&root, &segments).cloned()
    }

    pub fn seed(&self, key: &str, value: Value) {
        let segments = split(key);
        let mut root = self.root.lock().unwrap();
        insert(&mut root, &segments, value);
    }
}

fn split(key: &str) -> Vec<String> {
    key.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn insert(root: &mut Value, segments: &[String], value: Value) {
    let mut current = root;
    for segment in segments {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            _ => unreachable!(),
        };
    }
    *current = value;
}

fn remove(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        *root = Value::Null;
        return;
    };
    let mut current = root;
    for segment in parents {
        current = match current {
            Value::Object(map) => match map.get_mut(segment) {
                Some(next) => next,
                None => return,
            },
            _ => return,
        };
    }
    if let Value::Object(map) = current {
        map.remove(last);
    }
}

impl Respond for MemoryStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        // First path segment is the store id
        let path = request.url.path();
        let key = path
            .trim_start_matches('/')
            .split_once('/')
            .map(|(_, key)| key)
            .unwrap_or("");
        let segments = split(key);

        let mut root = self.root.lock().unwrap();
        match request.method.as_str() {
            "GET" => envelope(lookup(&root, &segments).cloned().unwrap_or(Value::Null), true),
            "POST" | "PUT" => match serde_json::from_slice::<Value>(&request.body) {
                Ok(value) => {
                    insert(&mut root, &segments, value.clone());
                    envelope(value, true)
                }
                Err(_) => ResponseTemplate::new(400).set_body_string("invalid JSON body"),
            },
            "DELETE" => {
                remove(&mut root, &segments);
                envelope(Value::Null, true)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}
