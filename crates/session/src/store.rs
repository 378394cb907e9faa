//! Store seam and the in-process implementation
//!
//! The store contract is deliberately small: write a field group with a
//! TTL, read it back whole, re-arm its expiry, delete it. Per-key writes
//! are atomic; nothing else is. A key with no fields reads as `None`, which
//! deliberately covers "never existed", "expired" and "deleted" alike.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::record::SessionRecord;

/// Key-value backing for session records.
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Write all fields of a record under `token` and arm the group expiry.
    /// Overwrites any existing group under the same key.
    fn write(
        &self,
        token: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read the full field group. `None` when the key holds no fields.
    fn read(&self, token: &str) -> impl Future<Output = Result<Option<SessionRecord>>> + Send;

    /// Re-arm the group expiry to `ttl` from now. A missing key is a no-op.
    fn expire_in(&self, token: &str, ttl: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Delete the group. A missing key is a no-op.
    fn delete(&self, token: &str) -> impl Future<Output = Result<()>> + Send;
}

struct Entry {
    record: SessionRecord,
    deadline: Instant,
}

/// In-process store on `tokio::time` deadlines.
///
/// Used by the test suites: a paused runtime clock makes TTL behavior
/// simulable. Sessions die with the process, so this is not a fit for
/// anything beyond tests and local experiments.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    async fn write(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            token.to_owned(),
            Entry {
                record: record.clone(),
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn read(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get(token) else {
            return Ok(None);
        };
        if entry.deadline > Instant::now() {
            return Ok(Some(entry.record.clone()));
        }
        // Lazy removal, mirroring how a TTL store reaps keys.
        entries.remove(token);
        Ok(None)
    }

    async fn expire_in(&self, token: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(token) {
            entry.deadline = Instant::now() + ttl;
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(token);
        Ok(())
    }
}
