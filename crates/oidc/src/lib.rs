//! OpenID-Connect provider client
//!
//! Talks to a realm-scoped OIDC provider (Keycloak-shaped endpoints) on
//! behalf of the session broker. This crate is a standalone library with no
//! dependency on the service binary.
//!
//! Login flow:
//! 1. Service redirects the browser to `build_authorization_url()`
//! 2. Provider calls back with an authorization code
//! 3. Service calls `OidcClient::exchange_code()` for the token set
//! 4. `claims::decode()` extracts the ID-token claim map (unsigned)
//! 5. On refresh, `OidcClient::exchange_refresh()` rotates the token pair
//! 6. On logout, `OidcClient::end_session()` notifies the provider
//!
//! None of the three provider calls is retried internally: each consumes a
//! one-time authorization code or rotates a refresh token, so a blind retry
//! could double-spend a credential.

pub mod claims;
pub mod client;
pub mod endpoints;
pub mod error;

pub use claims::{ClaimMap, Identity, decode};
pub use client::{CodeGrant, OidcClient, RefreshGrant};
pub use endpoints::{ProviderEndpoints, build_authorization_url};
pub use error::{Error, Result};
