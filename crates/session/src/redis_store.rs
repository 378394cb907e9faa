//! Redis-backed session store
//!
//! One hash per opaque token under `login:token:<token>`, with a key-level
//! TTL armed to the provider-reported refresh lifetime. HGETALL on a
//! missing or expired key yields an empty map, which is exactly the
//! contract's "no session". Write-plus-expire runs as an atomic pipeline so
//! a group can never exist without its TTL.

use std::collections::HashMap;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::{Error, Result};
use crate::record::SessionRecord;
use crate::store::SessionStore;

const KEY_PREFIX: &str = "login:token:";

/// Session store over a shared Redis connection manager.
///
/// `ConnectionManager` multiplexes and reconnects under the hood, so
/// cloning this store is cheap and handler-safe.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connect to the store. Fails with `StoreUnavailable` when the URL is
    /// invalid or the initial connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::StoreUnavailable(format!("invalid store url: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("store connection failed: {e}")))?;
        Ok(Self { conn })
    }

    fn key(token: &str) -> String {
        format!("{KEY_PREFIX}{token}")
    }
}

impl SessionStore for RedisSessionStore {
    async fn write(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = Self::key(token);
        let fields = record.to_fields();

        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields)
            .expire(&key, ttl.as_secs() as i64)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("session write failed: {e}")))?;
        Ok(())
    }

    async fn read(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn
            .hgetall(Self::key(token))
            .await
            .map_err(|e| Error::StoreUnavailable(format!("session read failed: {e}")))?;

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(SessionRecord::from_fields(fields)))
    }

    async fn expire_in(&self, token: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .expire(Self::key(token), ttl.as_secs() as i64)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("session expire failed: {e}")))?;
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(Self::key(token))
            .await
            .map_err(|e| Error::StoreUnavailable(format!("session delete failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed_per_store_schema() {
        assert_eq!(
            RedisSessionStore::key("deadbeef"),
            "login:token:deadbeef"
        );
    }

    #[tokio::test]
    async fn connect_rejects_invalid_url() {
        // Malformed URLs fail in Client::open, before any network I/O.
        let err = RedisSessionStore::connect("not-a-url").await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)), "got: {err:?}");
    }
}
