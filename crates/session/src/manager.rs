//! Session lifecycle: create, resolve, rotate, revoke
//!
//! Rotation writes the new record first, then shortens the old record's TTL
//! to the grace window. The two writes are not transactional: a crash in
//! between leaves the old record live at full TTL, and the old token simply
//! keeps working until it expires.

use std::time::Duration;

use tracing::{info, warn};

use oidc::{Identity, OidcClient};

use crate::error::{Error, Result};
use crate::record::SessionRecord;
use crate::store::SessionStore;

/// How long a superseded token stays resolvable after rotation. Tolerates
/// requests already in flight with the old token and bounds the exposure of
/// the consumed refresh token stored alongside it.
pub const ROTATION_GRACE: Duration = Duration::from_secs(30);

/// Generate a fresh opaque login token: 122 random bits in plain hex, no
/// separators. Unrelated in format to any provider token.
fn new_login_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Owns the mapping from opaque token to session record.
#[derive(Clone)]
pub struct SessionManager<S> {
    store: S,
    provider: OidcClient,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, provider: OidcClient) -> Self {
        Self { store, provider }
    }

    /// Issue a session for a freshly authenticated identity.
    ///
    /// `ttl_secs` is the provider-reported refresh-token lifetime; the
    /// record's store expiry is driven by it, never invented locally.
    pub async fn create(
        &self,
        identity: &Identity,
        access_token: String,
        refresh_token: String,
        ttl_secs: u64,
    ) -> Result<String> {
        let token = new_login_token();
        let record = SessionRecord::new(identity, access_token, refresh_token);
        self.store
            .write(&token, &record, Duration::from_secs(ttl_secs))
            .await?;
        info!(user_id = %record.user_id, ttl_secs, "session created");
        Ok(token)
    }

    /// Look up the record behind a token. `Ok(None)` covers never-existed,
    /// expired and revoked alike. No side effects.
    pub async fn resolve(&self, token: &str) -> Result<Option<SessionRecord>> {
        self.store.read(token).await
    }

    /// Rotate a session: trade its refresh token for a new provider pair,
    /// issue a new opaque token, and put the old one on the grace clock.
    ///
    /// Returns the new token and its TTL in seconds. When the provider
    /// rejects the refresh token, the old record is left exactly as it was.
    pub async fn rotate(&self, old_token: &str) -> Result<(String, u64)> {
        let old = self
            .store
            .read(old_token)
            .await?
            .ok_or(Error::SessionExpired)?;

        if old.refresh_token.is_empty() {
            return Err(Error::MalformedSession("record has no refresh token".into()));
        }

        let grant = self.provider.exchange_refresh(&old.refresh_token).await?;

        // Same identity snapshot, fresh provider pair. The access token is
        // replaced too: the refresh response carries a current one, and a
        // stale access token would break downstream pass-through calls.
        let record = SessionRecord {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            ..old
        };

        let new_token = new_login_token();
        self.store
            .write(&new_token, &record, Duration::from_secs(grant.refresh_expires_in))
            .await?;
        self.store.expire_in(old_token, ROTATION_GRACE).await?;

        info!(
            user_id = %record.user_id,
            ttl_secs = grant.refresh_expires_in,
            grace_secs = ROTATION_GRACE.as_secs(),
            "session rotated"
        );
        Ok((new_token, grant.refresh_expires_in))
    }

    /// End a session. Provider notification is best-effort; local deletion
    /// always happens, so a provider outage can never trap a user in a
    /// session they asked to leave. Revoking an unknown token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        let Some(record) = self.store.read(token).await? else {
            return Ok(());
        };

        if !record.refresh_token.is_empty() {
            if let Err(e) = self.provider.end_session(&record.refresh_token).await {
                warn!(error = %e, "provider end-session failed, revoking locally anyway");
            }
        }

        self.store.delete(token).await?;
        info!(user_id = %record.user_id, "session revoked");
        Ok(())
    }
}
