use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::KvStore;

const COLLECTION_NAME: &str = "access_logs";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    #[serde(rename = "_id")]
    key: String,
    value: String,
    expire_at: DateTime,
}

/// MongoDB-backed key-value store.
///
/// One document per ledger entry, keyed by `_id`, with a TTL index on
/// `expire_at` so MongoDB reaps expired records itself. The reaper only runs
/// periodically, so reads additionally filter on `expire_at` to keep expiry
/// exact.
pub struct MongoStore {
    db: Database,
    collection: Collection<StoredEntry>,
}

impl MongoStore {
    pub async fn new(db: Database) -> Result<Self> {
        let collection = db.collection::<StoredEntry>(COLLECTION_NAME);

        // expire_after(0) makes documents expire at the time stored in
        // expire_at rather than a fixed interval after insertion.
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expire_at": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        collection
            .create_index(ttl_index)
            .await
            .context("Failed to create TTL index on access_logs")?;

        Ok(Self { db, collection })
    }
}

#[async_trait]
impl KvStore for MongoStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let entry = StoredEntry {
            key: key.to_string(),
            value: value.to_string(),
            expire_at: DateTime::from_millis(
                chrono::Utc::now().timestamp_millis() + (ttl_secs as i64) * 1000,
            ),
        };
        self.collection
            .insert_one(&entry)
            .await
            .with_context(|| format!("Failed to write key {}", key))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self
            .collection
            .find_one(doc! { "_id": key, "expire_at": { "$gt": DateTime::now() } })
            .await
            .with_context(|| format!("Failed to read key {}", key))?;
        Ok(entry.map(|e| e.value))
    }

    async fn list(&self, limit: usize) -> Result<Vec<String>> {
        let mut cursor = self
            .collection
            .find(doc! { "expire_at": { "$gt": DateTime::now() } })
            .sort(doc! { "_id": -1 })
            .limit(limit as i64)
            .await
            .context("Failed to list keys")?;

        let mut keys = Vec::new();
        while let Some(entry) = cursor.try_next().await.context("Failed to read key listing")? {
            keys.push(entry.key);
        }
        Ok(keys)
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("Database connection failed")?;
        Ok(())
    }
}
