//! Printer status and enumeration routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /printer-status | GET | four-stage readiness check for one printer |
//! | /list-printers | GET | configured printers + CUPS-visible queues |

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::core::{GatewayResult, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/printer-status", get(printer_status))
        .route("/list-printers", get(list_printers))
}

/// Query naming the target printer, shared by most endpoints
#[derive(Debug, Deserialize)]
pub struct PrinterQuery {
    pub printer: String,
}

#[derive(Serialize)]
pub struct PrinterStatusResponse {
    printer: String,
    /// CUPS queue the printer maps to
    queue: String,
    status: &'static str,
}

/// GET /printer-status - ready / unconfigured / not_found / disabled / not_accepting
///
/// The error branches come straight out of [`ServerState::check_printer`],
/// each carrying its remediation command.
async fn printer_status(
    State(state): State<ServerState>,
    Query(q): Query<PrinterQuery>,
) -> GatewayResult<Json<PrinterStatusResponse>> {
    let queue = state.check_printer(&q.printer).await?;
    Ok(Json(PrinterStatusResponse {
        printer: q.printer,
        queue,
        status: "ready",
    }))
}

#[derive(Serialize)]
pub struct ConfiguredPrinter {
    name: String,
    queue: String,
}

#[derive(Serialize)]
pub struct ListPrintersResponse {
    printers: Vec<ConfiguredPrinter>,
    /// Queues the spooler reports, configured here or not
    cups_queues: Vec<String>,
    count: usize,
}

/// GET /list-printers
async fn list_printers(
    State(state): State<ServerState>,
) -> GatewayResult<Json<ListPrintersResponse>> {
    let printers: Vec<ConfiguredPrinter> = state
        .config
        .printers
        .iter()
        .map(|(name, queue)| ConfiguredPrinter {
            name: name.clone(),
            queue: queue.clone(),
        })
        .collect();

    let cups_queues = state.backend.list_queues().await?;

    Ok(Json(ListPrintersResponse {
        count: printers.len(),
        printers,
        cups_queues,
    }))
}
