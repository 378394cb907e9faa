//! The persisted session record
//!
//! One field group per opaque token. The identity trio is a snapshot of the
//! provider claims taken at creation or rotation time; it is never
//! re-validated against the provider afterwards. The provider token pair is
//! server-side only: the refresh token in particular must never reach the
//! client.

use std::collections::HashMap;

use oidc::Identity;

pub(crate) const FIELD_USER_ID: &str = "userId";
pub(crate) const FIELD_USERNAME: &str = "username";
pub(crate) const FIELD_EMAIL: &str = "email";
pub(crate) const FIELD_ACCESS_TOKEN: &str = "accessToken";
pub(crate) const FIELD_REFRESH_TOKEN: &str = "refreshToken";

/// Field group stored per live session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Provider bearer credential, passed through for downstream calls to
    /// the provider's other APIs; opaque to the broker itself.
    pub access_token: String,
    /// Provider credential used solely to obtain a new token pair.
    pub refresh_token: String,
}

impl SessionRecord {
    /// Snapshot a decoded identity plus the provider token pair.
    pub fn new(identity: &Identity, access_token: String, refresh_token: String) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            access_token,
            refresh_token,
        }
    }

    /// Store field pairs, in the store's flat string schema.
    pub(crate) fn to_fields(&self) -> [(&'static str, &str); 5] {
        [
            (FIELD_USER_ID, self.user_id.as_str()),
            (FIELD_USERNAME, self.username.as_str()),
            (FIELD_EMAIL, self.email.as_str()),
            (FIELD_ACCESS_TOKEN, self.access_token.as_str()),
            (FIELD_REFRESH_TOKEN, self.refresh_token.as_str()),
        ]
    }

    /// Rebuild a record from stored fields. Lenient on shape: a missing
    /// field becomes an empty string, and the operation that actually needs
    /// the field decides whether that is fatal. The caller guarantees the
    /// map is non-empty (an empty group means "no session", not a record).
    pub(crate) fn from_fields(mut fields: HashMap<String, String>) -> Self {
        let mut take = |name: &str| fields.remove(name).unwrap_or_default();
        Self {
            user_id: take(FIELD_USER_ID),
            username: take(FIELD_USERNAME),
            email: take(FIELD_EMAIL),
            access_token: take(FIELD_ACCESS_TOKEN),
            refresh_token: take(FIELD_REFRESH_TOKEN),
        }
    }
}
