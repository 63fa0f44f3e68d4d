pub mod memory;

pub use memory::{MemoryDocumentStore, MemoryKeyValueStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    AlreadyExists,
}

/// Remote document store capability. Backends are expected to provide the
/// usual per-document operations plus one transactional primitive:
/// `insert_if_absent` runs the existence check and the write inside a single
/// transaction, so two contending writers can never both create the same
/// document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// With `merge = true`, top-level fields of `doc` are merged into the
    /// existing document instead of replacing it.
    async fn set(&self, collection: &str, key: &str, doc: Value, merge: bool) -> Result<()>;

    /// Idempotent: deleting a missing document succeeds.
    async fn delete(&self, collection: &str, key: &str) -> Result<()>;

    /// Snapshot of all documents whose string field `field` equals `value`,
    /// paired with their document keys.
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Value)>>;

    /// Atomic check-then-create.
    async fn insert_if_absent(
        &self,
        collection: &str,
        key: &str,
        doc: Value,
    ) -> Result<InsertOutcome>;

    /// Store-assigned creation timestamp.
    fn server_timestamp(&self) -> DateTime<Utc>;
}

/// Local persistent key-value storage, namespaced by the caller.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}
