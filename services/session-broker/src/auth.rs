//! Request authentication middleware
//!
//! Every route outside the auth surface passes through `require_session`:
//! the bearer token is resolved against the session store and the record is
//! bound into the request's extensions. Extensions live exactly as long as
//! the request, so the binding cannot leak across requests on a reused
//! worker; there is no process-wide slot to clear.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use session::{SessionRecord, SessionStore};

use crate::error::ApiError;
use crate::metrics;
use crate::routes::AppState;

/// The identity resolved for the current request. Handlers read it via
/// `Extension<CurrentUser>`. Carries the full record so downstream calls
/// can pass the provider access token through; handlers must not echo the
/// token fields to the client.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionRecord);

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated("missing token"))
}

/// Reject the request unless its bearer token resolves to a live session.
pub async fn require_session<S: SessionStore>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => {
            metrics::record_auth_rejected("missing_token");
            return Err(e);
        }
    };

    let Some(record) = state.sessions.resolve(token).await? else {
        metrics::record_auth_rejected("expired");
        return Err(ApiError::Unauthenticated("session expired"));
    };

    request.extensions_mut().insert(CurrentUser(record));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_from_bearer_header() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated("missing token")));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let err = bearer_token(&headers_with("Basic dXNlcjpwdw==")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated("missing token")));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        // "bearer" (lowercase) is not accepted; the flow always issues the
        // canonical form.
        let err = bearer_token(&headers_with("bearer abc123")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
