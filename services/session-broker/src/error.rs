//! Service-facing error type and its HTTP mapping
//!
//! Every failure is mapped to a single terminal outcome: a status code and
//! a JSON body of the shape `{"code":<status>,"msg":"<reason>"}`. Internal
//! detail (store addresses, provider response bodies) is logged server-side
//! and never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Failures a handler can surface to the client.
#[derive(Debug)]
pub enum ApiError {
    /// No token, malformed header, or a token that resolves to nothing.
    /// The reason string is client-visible.
    Unauthenticated(&'static str),
    /// The provider or the stored record invalidated the session; the
    /// client must re-authenticate. Detail is logged only.
    SessionInvalid(String),
    /// Transport failure talking to the provider.
    ProviderUnreachable(String),
    /// The provider returned an identity token that cannot be decoded.
    MalformedToken(String),
    /// The session store could not serve the request.
    StoreUnavailable(String),
}

impl From<session::Error> for ApiError {
    fn from(err: session::Error) -> Self {
        match err {
            session::Error::SessionExpired => ApiError::Unauthenticated("session expired"),
            session::Error::MalformedSession(detail) => ApiError::SessionInvalid(detail),
            session::Error::StoreUnavailable(detail) => ApiError::StoreUnavailable(detail),
            session::Error::Provider(e) => e.into(),
        }
    }
}

impl From<oidc::Error> for ApiError {
    fn from(err: oidc::Error) -> Self {
        match err {
            oidc::Error::Unreachable(detail) => ApiError::ProviderUnreachable(detail),
            oidc::Error::Rejected(detail) => ApiError::SessionInvalid(detail),
            oidc::Error::MalformedToken(detail) => ApiError::MalformedToken(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Unauthenticated(reason) => (StatusCode::UNAUTHORIZED, reason),
            ApiError::SessionInvalid(detail) => {
                warn!(detail = %detail, "session invalidated");
                (StatusCode::UNAUTHORIZED, "session invalid, re-authenticate")
            }
            ApiError::ProviderUnreachable(detail) => {
                error!(detail = %detail, "identity provider unreachable");
                (StatusCode::BAD_GATEWAY, "identity provider unreachable")
            }
            ApiError::MalformedToken(detail) => {
                warn!(detail = %detail, "identity token could not be decoded");
                (StatusCode::BAD_GATEWAY, "identity token malformed")
            }
            ApiError::StoreUnavailable(detail) => {
                error!(detail = %detail, "session store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "session store unavailable")
            }
        };

        let body = serde_json::json!({"code": status.as_u16(), "msg": msg});
        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
