//! API routes
//!
//! # Structure
//!
//! - [`health`] - health check (public)
//! - [`printers`] - printer status and enumeration
//! - [`print`] - text, image and raw passthrough printing
//! - [`control`] - beep, cut, feed, cash drawer
//!
//! Every module exposes a `router()`; [`build_app`] merges them and layers
//! the shared middleware (tracing, request ids, CORS, body limit, API key).

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware as axum_middleware,
    middleware::Next,
    response::Response,
};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth;
use crate::core::{GatewayError, ServerState};

pub mod control;
pub mod health;
pub mod print;
pub mod printers;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(printers::router())
        .merge(print::router())
        .merge(control::router())
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: &ServerState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    build_router()
        // API key check - innermost, sees routed requests only
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        // Declared-length rejection before any body is read
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            enforce_upload_limit,
        ))
        // Hard cap on bodies without a Content-Length header
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - gzip responses
        .layer(CompressionLayer::new())
        // Request logging
        .layer(TraceLayer::new_for_http())
        // Request IDs
        .layer(SetRequestIdLayer::new(x_request_id.clone(), XRequestId))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .with_state(state.clone())
}

/// Reject requests whose declared Content-Length exceeds the configured cap
async fn enforce_upload_limit(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let limit = state.config.max_upload_bytes;
    if let Some(declared) = req
        .headers()
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        && declared > limit
    {
        return Err(GatewayError::UploadTooLarge(format!(
            "payload of {declared} bytes exceeds the {limit} byte limit"
        )));
    }
    Ok(next.run(req).await)
}

/// Range-check a numeric parameter, rejecting (not clamping) out-of-range values
pub(crate) fn in_range(name: &str, value: i64, lo: i64, hi: i64) -> Result<u8, GatewayError> {
    if (lo..=hi).contains(&value) {
        Ok(value as u8)
    } else {
        Err(GatewayError::BadRequest(format!(
            "{name} must be {lo}-{hi}, got {value}"
        )))
    }
}
