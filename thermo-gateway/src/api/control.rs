//! Utility control routes: single ESC/POS command emissions
//!
//! | Path | Methods | Description |
//! |------|---------|-------------|
//! | /beep | GET, POST | buzzer, count x duration (each 1-9) |
//! | /cut | GET, POST | feed then cut, partial or full |
//! | /feed | GET, POST | feed 0-255 lines |
//! | /drawer | GET, POST | cash drawer pulse on pin 2 or 5 |
//!
//! These use bare command sequences (no ESC @ init) so they do not clobber
//! printer settings mid-ticket.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use thermo_escpos::{CutMode, EscPosBuilder};

use super::in_range;
use super::print::append_cut;
use crate::core::{GatewayResult, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/beep", get(beep).post(beep))
        .route("/cut", get(cut).post(cut))
        .route("/feed", get(feed).post(feed))
        .route("/drawer", get(drawer).post(drawer))
}

fn default_one() -> i64 {
    1
}
fn default_three() -> i64 {
    3
}
fn default_hundred() -> i64 {
    100
}

// ========== /beep ==========

#[derive(Debug, Deserialize)]
pub struct BeepQuery {
    pub printer: String,
    #[serde(default = "default_one")]
    pub count: i64,
    #[serde(default = "default_one")]
    pub duration: i64,
}

#[derive(Serialize)]
pub struct BeepResponse {
    message: &'static str,
    printer: String,
    job_id: String,
    count: u8,
    duration_units_100ms: u8,
}

async fn beep(
    State(state): State<ServerState>,
    Query(q): Query<BeepQuery>,
) -> GatewayResult<Json<BeepResponse>> {
    let count = in_range("count", q.count, 1, 9)?;
    let duration = in_range("duration", q.duration, 1, 9)?;

    let mut builder = EscPosBuilder::bare();
    builder.beep(count, duration);
    let job_id = state.submit(&q.printer, builder.build()).await?;

    Ok(Json(BeepResponse {
        message: "Beep sent",
        printer: q.printer,
        job_id,
        count,
        duration_units_100ms: duration,
    }))
}

// ========== /cut ==========

#[derive(Debug, Deserialize)]
pub struct CutQuery {
    pub printer: String,
    #[serde(default = "default_three")]
    pub feed: i64,
    #[serde(default)]
    pub mode: CutMode,
}

#[derive(Serialize)]
pub struct CutResponse {
    message: &'static str,
    printer: String,
    job_id: String,
}

async fn cut(
    State(state): State<ServerState>,
    Query(q): Query<CutQuery>,
) -> GatewayResult<Json<CutResponse>> {
    let feed = in_range("feed", q.feed, 0, 255)?;

    let mut builder = EscPosBuilder::bare();
    append_cut(&mut builder, q.mode, feed);
    let job_id = state.submit(&q.printer, builder.build()).await?;

    Ok(Json(CutResponse {
        message: "Paper cut",
        printer: q.printer,
        job_id,
    }))
}

// ========== /feed ==========

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub printer: String,
    #[serde(default = "default_three")]
    pub lines: i64,
}

#[derive(Serialize)]
pub struct FeedResponse {
    message: &'static str,
    printer: String,
    job_id: String,
    lines: u8,
}

async fn feed(
    State(state): State<ServerState>,
    Query(q): Query<FeedQuery>,
) -> GatewayResult<Json<FeedResponse>> {
    let lines = in_range("lines", q.lines, 0, 255)?;

    let mut builder = EscPosBuilder::bare();
    builder.feed(lines);
    let job_id = state.submit(&q.printer, builder.build()).await?;

    Ok(Json(FeedResponse {
        message: "Paper fed",
        printer: q.printer,
        job_id,
        lines,
    }))
}

// ========== /drawer ==========

#[derive(Debug, Deserialize)]
pub struct DrawerQuery {
    pub printer: String,
    /// 0 = drawer pin 2, 1 = drawer pin 5
    #[serde(default)]
    pub pin: i64,
    #[serde(default = "default_hundred")]
    pub t1: i64,
    #[serde(default = "default_hundred")]
    pub t2: i64,
}

#[derive(Serialize)]
pub struct DrawerResponse {
    message: &'static str,
    printer: String,
    job_id: String,
    pin: u8,
}

async fn drawer(
    State(state): State<ServerState>,
    Query(q): Query<DrawerQuery>,
) -> GatewayResult<Json<DrawerResponse>> {
    let pin = in_range("pin", q.pin, 0, 1)?;
    let t1 = in_range("t1", q.t1, 0, 255)?;
    let t2 = in_range("t2", q.t2, 0, 255)?;

    let mut builder = EscPosBuilder::bare();
    builder.drawer_pulse(pin, t1, t2);
    let job_id = state.submit(&q.printer, builder.build()).await?;

    Ok(Json(DrawerResponse {
        message: "Cash drawer opened",
        printer: q.printer,
        job_id,
        pin,
    }))
}
