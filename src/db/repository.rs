//! Per-user repository contract
//!
//! Every record type is stored in its own collection and partitioned by
//! `user_id`. Reads always filter by the partition first, so a record owned by
//! another user is indistinguishable from a missing one.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::pagination::Pagination;
use crate::db::schemas::Envelope;
use crate::types::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A persisted document with the common envelope
pub trait Record: Serialize + DeserializeOwned + Clone + Unpin + Send + Sync + 'static {
    /// Collection holding this record type
    const COLLECTION: &'static str;

    /// Fields that must be unique per user, in addition to `id`
    const UNIQUE: &'static [&'static str] = &[];

    fn envelope(&self) -> &Envelope;

    fn envelope_mut(&mut self) -> &mut Envelope;

    fn id(&self) -> &str {
        &self.envelope().id
    }

    fn user_id(&self) -> &str {
        &self.envelope().user_id
    }
}

/// Equality filters applied after the partition filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    filters: Vec<(String, Value)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.filters.push((field.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a serialized record satisfies every filter
    pub fn matches(&self, doc: &Value) -> bool {
        self.iter().all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// Storage operations for one record type
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// All records owned by `user_id` that match `scope`
    async fn list(&self, user_id: &str, scope: &Scope) -> StoreResult<Vec<T>>;

    /// One page of records in creation order
    async fn page(
        &self,
        user_id: &str,
        scope: &Scope,
        pagination: &Pagination,
    ) -> StoreResult<Vec<T>>;

    /// Point lookup within the caller's partition
    async fn get(&self, user_id: &str, id: &str) -> StoreResult<T>;

    /// First record (in creation order) matching `scope`
    async fn find_first(&self, user_id: &str, scope: &Scope) -> StoreResult<Option<T>>;

    /// Insert or fully replace the record keyed by `(user_id, id)`
    async fn upsert(&self, record: T) -> StoreResult<T>;

    async fn delete(&self, user_id: &str, id: &str) -> StoreResult<()>;
}

/// Project the `UNIQUE` fields of a serialized record
pub(crate) fn unique_values<T: Record>(doc: &Value) -> Option<Vec<Value>> {
    if T::UNIQUE.is_empty() {
        return None;
    }
    Some(
        T::UNIQUE
            .iter()
            .map(|field| doc.get(*field).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}
