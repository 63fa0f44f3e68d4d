use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::Result;
use tokio::sync::Mutex;

use super::{DocumentStore, InsertOutcome, KeyValueStore};

type Collection = BTreeMap<String, Value>;

/// In-memory document store used by tests and the demo binary. All writes go
/// through a single lock, which is what makes `insert_if_absent` atomic.
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Collection>>,
    writes: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Total number of mutating operations accepted so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn set(&self, collection: &str, key: &str, doc: Value, merge: bool) -> Result<()> {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let merged = if merge {
            match (docs.get(key), &doc) {
                (Some(Value::Object(existing)), Value::Object(fields)) => {
                    let mut combined = existing.clone();
                    for (field, value) in fields {
                        combined.insert(field.clone(), value.clone());
                    }
                    Some(Value::Object(combined))
                }
                _ => None,
            }
        } else {
            None
        };
        docs.insert(key.to_string(), merged.unwrap_or(doc));

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let mut collections = self.collections.lock().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(key);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Value)>> {
        let collections = self.collections.lock().await;
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        key: &str,
        doc: Value,
    ) -> Result<InsertOutcome> {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.contains_key(key) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        docs.insert(key.to_string(), doc);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(InsertOutcome::Created)
    }

    fn server_timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// In-memory stand-in for the device's persistent key-value storage.
pub struct MemoryKeyValueStore {
    entries: StdMutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: StdMutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}
