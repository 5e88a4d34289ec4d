//! Health check routes - public (no API key)
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | / | GET | alias of /health |
//! | /health | GET | gateway liveness + configured printers |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    /// Always "running" - a dead server answers nothing
    status: &'static str,
    version: &'static str,
    /// Configured printer names
    printers: Vec<String>,
    /// Backend description
    backend: &'static str,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        printers: state.config.printer_names(),
        backend: state.backend.name(),
    })
}
