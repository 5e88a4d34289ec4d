//! Authentication middleware
//!
//! Checks the `X-API-Key` header against the configured secret.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::core::{GatewayError, ServerState};

const API_KEY_HEADER: &str = "x-api-key";

/// API key middleware
///
/// Disabled entirely when no `API_KEY` is configured - small LAN deployments
/// run open, the key is for anything reachable beyond the local network.
///
/// # Paths that skip the check
///
/// - `OPTIONS *` (CORS preflight)
/// - `/` and `/health` (liveness probes carry no secrets)
///
/// # Errors
///
/// Missing or mismatched key -> 401 `unauthorized`.
pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let Some(expected) = &state.config.api_key else {
        return Ok(next.run(req).await);
    };

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if path == "/" || path == "/health" {
        return Ok(next.run(req).await);
    }

    match req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        Some(key) if key == expected => Ok(next.run(req).await),
        Some(_) => {
            warn!(path = path, "rejected request with wrong API key");
            Err(GatewayError::Unauthorized)
        }
        None => {
            warn!(path = path, "rejected request with no API key");
            Err(GatewayError::Unauthorized)
        }
    }
}
