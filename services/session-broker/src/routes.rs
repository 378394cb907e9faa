//! Router and HTTP handlers
//!
//! The auth surface (`/auth/*`) plus `/health` and `/metrics` is reachable
//! without a session; everything else sits behind the bearer-token
//! middleware. Response bodies use camelCase keys, matching what the
//! browser client consumes.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::{Extension, Json, Router};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use oidc::{Identity, OidcClient};
use serde::Deserialize;
use session::{SessionManager, SessionStore};

use crate::auth::{self, CurrentUser, bearer_token};
use crate::error::ApiError;
use crate::metrics;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState<S: SessionStore> {
    pub sessions: SessionManager<S>,
    pub provider: OidcClient,
    pub prometheus: PrometheusHandle,
    pub started_at: std::time::Instant,
}

/// Build the axum router with all routes and shared state.
///
/// Applies a concurrency limit layer based on `max_connections`.
pub fn build_router<S: SessionStore>(state: AppState<S>, max_connections: usize) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_session::<S>,
        ));

    Router::new()
        .route("/auth/login", get(login::<S>))
        .route("/auth/callback", get(callback::<S>))
        .route("/auth/refresh", post(refresh::<S>))
        .route("/auth/logout", post(logout::<S>))
        .route("/health", get(health::<S>))
        .route("/metrics", get(metrics_handler::<S>))
        .merge(protected)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

/// GET /auth/login — hand the browser to the provider's authorization page.
async fn login<S: SessionStore>(State(state): State<AppState<S>>) -> Redirect {
    Redirect::to(&state.provider.authorization_url())
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: String,
}

/// GET /auth/callback — exchange the authorization code, snapshot the
/// identity claims, issue an opaque session token.
async fn callback<S: SessionStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let grant = state.provider.exchange_code(&query.code).await?;
    let claims = oidc::decode(&grant.id_token)?;
    let identity = Identity::from_claims(&claims)?;

    let token = state
        .sessions
        .create(
            &identity,
            grant.access_token,
            grant.refresh_token,
            grant.refresh_expires_in,
        )
        .await?;
    metrics::record_session_created();

    Ok(Json(serde_json::json!({
        "token": token,
        "expiresIn": grant.refresh_expires_in,
        "user": {
            "userId": identity.user_id,
            "username": identity.username,
            "email": identity.email,
        },
    })))
}

/// POST /auth/refresh — rotate the session. The old token keeps resolving
/// for the grace window so responses already in flight stay valid.
async fn refresh<S: SessionStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let (new_token, expires_in) = state.sessions.rotate(token).await?;
    metrics::record_session_rotated();

    Ok(Json(serde_json::json!({
        "token": new_token,
        "expiresIn": expires_in,
    })))
}

/// POST /auth/logout — revoke the session. Idempotent: logging out a token
/// that no longer resolves is a success.
async fn logout<S: SessionStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?;
    state.sessions.revoke(token).await?;
    metrics::record_session_revoked();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /me — the identity bound to this request. The provider token pair
/// stays server-side.
async fn me(Extension(CurrentUser(record)): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "userId": record.user_id,
        "username": record.username,
        "email": record.email,
    }))
}

/// GET /health — liveness plus uptime.
async fn health<S: SessionStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs();
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": "healthy",
            "uptime_seconds": uptime,
        })
        .to_string(),
    )
}

/// GET /metrics — Prometheus text exposition format.
async fn metrics_handler<S: SessionStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
