//! Token endpoint interactions
//!
//! Handles the three provider calls the broker makes:
//! 1. Authorization-code exchange (login callback)
//! 2. Refresh exchange (session rotation)
//! 3. End-session notification (logout, best-effort at the call site)
//!
//! All three are form-encoded POSTs carrying the confidential client
//! credentials. The caller supplies the `reqwest::Client`, which is expected
//! to carry a bounded request timeout; a timeout surfaces as `Unreachable`.

use common::Secret;
use serde::Deserialize;
use tracing::debug;

use crate::endpoints::{ProviderEndpoints, build_authorization_url};
use crate::error::{Error, Result};

/// Token set returned by the authorization-code exchange.
///
/// `refresh_expires_in` is a delta in seconds from the response time; the
/// session store turns it into a key TTL, never a locally invented value.
#[derive(Debug, Deserialize)]
pub struct CodeGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    /// Seconds until the refresh token expires (delta, not absolute)
    pub refresh_expires_in: u64,
}

/// Token pair returned by the refresh exchange.
#[derive(Debug)]
pub struct RefreshGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_in: u64,
}

/// Wire shape of the refresh response. `refresh_token` is optional here so
/// its absence can be reported as a rejection rather than a decode error;
/// a provider that stops returning one has invalidated the session.
#[derive(Deserialize)]
struct RefreshWire {
    access_token: String,
    refresh_token: Option<String>,
    refresh_expires_in: u64,
}

/// Client for one configured provider realm.
#[derive(Clone)]
pub struct OidcClient {
    http: reqwest::Client,
    endpoints: ProviderEndpoints,
    client_id: String,
    client_secret: Secret,
    redirect_uri: String,
}

impl OidcClient {
    pub fn new(
        http: reqwest::Client,
        endpoints: ProviderEndpoints,
        client_id: String,
        client_secret: Secret,
        redirect_uri: String,
    ) -> Self {
        Self {
            http,
            endpoints,
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// URL the browser is redirected to when a login starts.
    pub fn authorization_url(&self) -> String {
        build_authorization_url(&self.endpoints, &self.client_id, &self.redirect_uri)
    }

    /// Exchange an authorization code for the provider token set.
    ///
    /// The code is single-use: a failed exchange must not be retried with
    /// the same code.
    pub async fn exchange_code(&self, code: &str) -> Result<CodeGrant> {
        debug!("exchanging authorization code");
        let response = self
            .http
            .post(self.endpoints.token())
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("code exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Rejected(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<CodeGrant>()
            .await
            .map_err(|e| Error::Rejected(format!("invalid code grant response: {e}")))
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The provider rotates the refresh token on every call, so the old one
    /// is consumed whether or not the caller persists the result.
    pub async fn exchange_refresh(&self, refresh_token: &str) -> Result<RefreshGrant> {
        debug!("exchanging refresh token");
        let response = self
            .http
            .post(self.endpoints.token())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Rejected(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let wire = response
            .json::<RefreshWire>()
            .await
            .map_err(|e| Error::Rejected(format!("invalid refresh response: {e}")))?;

        // No new refresh token means the provider invalidated the session;
        // never fabricate one from the old value.
        let refresh_token = wire.refresh_token.ok_or_else(|| {
            Error::Rejected("refresh response carries no refresh_token".into())
        })?;

        Ok(RefreshGrant {
            access_token: wire.access_token,
            refresh_token,
            refresh_expires_in: wire.refresh_expires_in,
        })
    }

    /// Notify the provider that a session ended.
    ///
    /// Failures are returned to the caller; the session manager treats them
    /// as best-effort and proceeds with local revocation either way.
    pub async fn end_session(&self, refresh_token: &str) -> Result<()> {
        debug!("notifying provider end-session");
        let response = self
            .http
            .post(self.endpoints.end_session())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("end-session request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rejected(format!(
                "end-session endpoint returned {status}"
            )));
        }
        Ok(())
    }
}
