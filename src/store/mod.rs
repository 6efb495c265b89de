pub mod memory;
pub mod mongo;

use anyhow::Result;
use async_trait::async_trait;

/// Append-only key-value store with per-record expiry.
///
/// Visits are written under fresh time-ordered keys and never updated or
/// deleted; the store drops them once their TTL elapses, so the ledger is a
/// rolling window rather than a permanent log.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`, expiring `ttl_secs` seconds from now.
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Fetch the value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// List up to `limit` keys, newest first. Expired keys are excluded.
    async fn list(&self, limit: usize) -> Result<Vec<String>>;

    /// Cheap liveness check for the health endpoint.
    async fn ping(&self) -> Result<()>;
}
