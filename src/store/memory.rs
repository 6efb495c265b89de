use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::KvStore;

/// In-memory key-value store.
///
/// Serves as the zero-config backend when no MongoDB is available and as the
/// test double for the handlers. Keys sort lexicographically in a BTreeMap,
/// which matches their time-ordered layout, so listing newest-first is just a
/// reverse walk. The clock can be moved forward with `advance_secs` to
/// exercise TTL expiry in tests.
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
    clock_offset_ms: AtomicI64,
}

struct Entry {
    value: String,
    expires_at_ms: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            clock_offset_ms: AtomicI64::new(0),
        }
    }

    /// Move this store's clock forward, expiring anything whose TTL has
    /// passed. Entries are only ever reaped lazily on read.
    pub fn advance_secs(&self, secs: i64) {
        self.clock_offset_ms.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() + self.clock_offset_ms.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let expires_at_ms = self.now_ms() + (ttl_secs as i64) * 1000;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.now_ms();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at_ms > now)
            .map(|e| e.value.clone()))
    }

    async fn list(&self, limit: usize) -> Result<Vec<String>> {
        let now = self.now_ms();
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|(_, e)| e.expires_at_ms > now)
            .take(limit)
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
