//! In-process repository
//!
//! Used by tests and by dev mode when MongoDB is unreachable. Records are kept
//! in their serialized form next to the typed value so scope filters and
//! unique checks see exactly what Mongo would store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::pagination::Pagination;
use crate::db::repository::{unique_values, Record, Repository, Scope, StoreResult};
use crate::types::StoreError;

struct Row<T> {
    /// Insertion sequence; kept across replaces so creation order is stable
    seq: u64,
    doc: Value,
    record: T,
}

struct State<T> {
    next_seq: u64,
    rows: HashMap<(String, String), Row<T>>,
}

pub struct MemoryRepository<T> {
    state: RwLock<State<T>>,
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_seq: 0,
                rows: HashMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Matching rows in creation order
    fn select<'a>(state: &'a State<T>, user_id: &str, scope: &Scope) -> Vec<&'a Row<T>> {
        let mut rows: Vec<&Row<T>> = state
            .rows
            .iter()
            .filter(|((owner, _), row)| owner == user_id && scope.matches(&row.doc))
            .map(|(_, row)| row)
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn list(&self, user_id: &str, scope: &Scope) -> StoreResult<Vec<T>> {
        let state = self.state.read().await;
        Ok(Self::select(&state, user_id, scope)
            .into_iter()
            .map(|row| row.record.clone())
            .collect())
    }

    async fn page(
        &self,
        user_id: &str,
        scope: &Scope,
        pagination: &Pagination,
    ) -> StoreResult<Vec<T>> {
        let state = self.state.read().await;
        let mut rows = Self::select(&state, user_id, scope);
        if pagination.sort_by_newest {
            rows.reverse();
        }

        Ok(rows
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn get(&self, user_id: &str, id: &str) -> StoreResult<T> {
        let state = self.state.read().await;
        state
            .rows
            .get(&(user_id.to_string(), id.to_string()))
            .map(|row| row.record.clone())
            .ok_or_else(|| StoreError::not_found(format!("{} {} not found", T::COLLECTION, id)))
    }

    async fn find_first(&self, user_id: &str, scope: &Scope) -> StoreResult<Option<T>> {
        let state = self.state.read().await;
        Ok(Self::select(&state, user_id, scope)
            .first()
            .map(|row| row.record.clone()))
    }

    async fn upsert(&self, record: T) -> StoreResult<T> {
        let doc = serde_json::to_value(&record)
            .map_err(|e| StoreError::unexpected(format!("encoding failed: {e}")))?;
        let key = (record.user_id().to_string(), record.id().to_string());

        let mut state = self.state.write().await;

        if let Some(values) = unique_values::<T>(&doc) {
            let taken = state.rows.iter().any(|((owner, id), row)| {
                *owner == key.0
                    && *id != key.1
                    && unique_values::<T>(&row.doc).as_ref() == Some(&values)
            });
            if taken {
                return Err(StoreError::conflict(format!(
                    "duplicate {} on {}",
                    T::COLLECTION,
                    T::UNIQUE.join(", ")
                )));
            }
        }

        let seq = match state.rows.get(&key) {
            Some(existing) => existing.seq,
            None => {
                state.next_seq += 1;
                state.next_seq
            }
        };

        state.rows.insert(
            key,
            Row {
                seq,
                doc,
                record: record.clone(),
            },
        );

        Ok(record)
    }

    async fn delete(&self, user_id: &str, id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .rows
            .remove(&(user_id.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("{} {} not found", T::COLLECTION, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Bookmark, Envelope, Expense};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn bookmark(user: &str, id: &str, link: &str) -> Bookmark {
        Bookmark {
            envelope: Envelope::with_id(id, user),
            link: link.into(),
            title: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_then_get_round_trips() {
        let repo = MemoryRepository::<Bookmark>::new();
        let stored = repo.upsert(bookmark("u1", "b1", "https://a")).await.unwrap();
        assert_eq!(repo.get("u1", "b1").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_partition_isolation() {
        let repo = MemoryRepository::<Bookmark>::new();
        repo.upsert(bookmark("u1", "b1", "https://a")).await.unwrap();

        let err = repo.get("u2", "b1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.list("u2", &Scope::new()).await.unwrap().is_empty());
        assert!(repo.delete("u2", "b1").await.unwrap_err().is_not_found());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_position() {
        let repo = MemoryRepository::<Bookmark>::new();
        for (id, link) in [("a", "1"), ("b", "2"), ("c", "3")] {
            repo.upsert(bookmark("u1", id, link)).await.unwrap();
        }

        let mut replaced = bookmark("u1", "a", "1");
        replaced.title = Some("first".into());
        repo.upsert(replaced).await.unwrap();

        let ids: Vec<String> = repo
            .list("u1", &Scope::new())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.envelope.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unique_constraint_per_user() {
        let repo = MemoryRepository::<Bookmark>::new();
        assert_ok!(repo.upsert(bookmark("u1", "b1", "https://a")).await);

        let err = assert_err!(repo.upsert(bookmark("u1", "b2", "https://a")).await);
        assert_eq!(err.status, 409);

        // Replacing the same record is not a conflict
        assert_ok!(repo.upsert(bookmark("u1", "b1", "https://a")).await);
        // Another user may hold the same link
        assert_ok!(repo.upsert(bookmark("u2", "b3", "https://a")).await);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_only_one_wins() {
        let repo = Arc::new(MemoryRepository::<Bookmark>::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.upsert(bookmark("u1", &format!("b{i}"), "https://same"))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_page_and_scope() {
        let repo = MemoryRepository::<Expense>::new();
        for i in 0..5 {
            let expense = Expense {
                envelope: Envelope::with_id(format!("e{i}"), "u1"),
                project_id: if i % 2 == 0 { "p1" } else { "p2" }.into(),
                items: format!("item {i}"),
                ..Default::default()
            };
            repo.upsert(expense).await.unwrap();
        }

        let scope = Scope::new().with("project_id", "p1");
        let all = repo.list("u1", &scope).await.unwrap();
        assert_eq!(all.len(), 3);

        let newest = repo
            .page("u1", &scope, &Pagination::new(0, 2, true))
            .await
            .unwrap();
        let ids: Vec<&str> = newest.iter().map(|e| e.envelope.id.as_str()).collect();
        assert_eq!(ids, ["e4", "e2"]);

        let first = repo.find_first("u1", &scope).await.unwrap().unwrap();
        assert_eq!(first.envelope.id, "e0");
        assert!(repo
            .find_first("u1", &Scope::new().with("project_id", "p9"))
            .await
            .unwrap()
            .is_none());
    }
}
