//! MongoDB client and repository
//!
//! One collection per record type. Every index leads with `user_id`, so each
//! query stays inside the caller's partition.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{options::IndexOptions, Client, Collection, IndexModel};
use tracing::{debug, info};

use crate::db::pagination::Pagination;
use crate::db::repository::{Record, Repository, Scope, StoreResult};
use crate::types::StoreError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

impl<T: Record> IntoIndexes for T {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let unique = || Some(IndexOptions::builder().unique(true).build());

        let mut indices = vec![
            (doc! { "user_id": 1, "id": 1 }, unique()),
            (doc! { "user_id": 1, "created": 1 }, None),
        ];

        if !T::UNIQUE.is_empty() {
            let mut keys = doc! { "user_id": 1 };
            for field in T::UNIQUE {
                keys.insert(*field, 1);
            }
            indices.push((keys, unique()));
        }

        indices
    }
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping, failing fast when the server is unreachable
    pub async fn new(uri: &str, db_name: &str) -> StoreResult<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri).await.map_err(|e| {
            StoreError::unavailable(format!("Failed to connect to MongoDB: {}", e))
        })?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::unavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Typed repository for `T`, with its indexes applied
    pub async fn repository<T: Record>(&self) -> StoreResult<MongoRepository<T>> {
        MongoRepository::new(&self.client, &self.db_name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Repository over one typed collection
#[derive(Debug, Clone)]
pub struct MongoRepository<T: Record> {
    inner: Collection<T>,
}

impl<T: Record> MongoRepository<T> {
    /// Open the collection named by `T::COLLECTION` and apply indexes
    pub async fn new(client: &Client, db_name: &str) -> StoreResult<Self> {
        let collection = client.database(db_name).collection::<T>(T::COLLECTION);
        let repo = MongoRepository { inner: collection };

        repo.apply_indexes().await?;

        Ok(repo)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> StoreResult<()> {
        let indices: Vec<IndexModel> = T::into_indices()
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner.create_indexes(indices).await.map_err(|e| {
            StoreError::unexpected(format!(
                "Failed to create indexes on {}: {}",
                T::COLLECTION,
                e
            ))
        })?;

        debug!(collection = T::COLLECTION, "indexes applied");
        Ok(())
    }

    /// Partition filter plus scope equality filters
    fn filter(user_id: &str, scope: &Scope) -> StoreResult<Document> {
        let mut filter = doc! { "user_id": user_id };
        for (field, value) in scope.iter() {
            let value: Bson = bson::to_bson(value)?;
            filter.insert(field, value);
        }
        Ok(filter)
    }

    fn key(user_id: &str, id: &str) -> Document {
        doc! { "user_id": user_id, "id": id }
    }

    fn creation_order(newest_first: bool) -> Document {
        let dir = if newest_first { -1 } else { 1 };
        doc! { "created": dir, "id": dir }
    }

    /// Mongo's `_id` is never part of a record
    fn projection() -> Document {
        doc! { "_id": 0 }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MongoRepository<T> {
    async fn list(&self, user_id: &str, scope: &Scope) -> StoreResult<Vec<T>> {
        let cursor = self
            .inner
            .find(Self::filter(user_id, scope)?)
            .sort(Self::creation_order(false))
            .projection(Self::projection())
            .await?;

        let records: Vec<T> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn page(
        &self,
        user_id: &str,
        scope: &Scope,
        pagination: &Pagination,
    ) -> StoreResult<Vec<T>> {
        let cursor = self
            .inner
            .find(Self::filter(user_id, scope)?)
            .sort(Self::creation_order(pagination.sort_by_newest))
            .skip(pagination.offset())
            .limit(pagination.per_page as i64)
            .projection(Self::projection())
            .await?;

        let records: Vec<T> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn get(&self, user_id: &str, id: &str) -> StoreResult<T> {
        self.inner
            .find_one(Self::key(user_id, id))
            .projection(Self::projection())
            .await?
            .ok_or_else(|| StoreError::not_found(format!("{} {} not found", T::COLLECTION, id)))
    }

    async fn find_first(&self, user_id: &str, scope: &Scope) -> StoreResult<Option<T>> {
        Ok(self
            .inner
            .find_one(Self::filter(user_id, scope)?)
            .sort(Self::creation_order(false))
            .projection(Self::projection())
            .await?)
    }

    async fn upsert(&self, record: T) -> StoreResult<T> {
        self.inner
            .replace_one(Self::key(record.user_id(), record.id()), &record)
            .upsert(true)
            .await?;

        Ok(record)
    }

    async fn delete(&self, user_id: &str, id: &str) -> StoreResult<()> {
        let result = self.inner.delete_one(Self::key(user_id, id)).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::not_found(format!(
                "{} {} not found",
                T::COLLECTION,
                id
            )));
        }
        Ok(())
    }
}
