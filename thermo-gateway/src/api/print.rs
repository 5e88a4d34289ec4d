//! Print routes: text, image, raw passthrough
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /print-text | POST | formatted text, JSON body `{text}` |
//! | /print-image | POST | multipart image upload, rastered to GS v 0 |
//! | /print-raw | POST | base64/hex payload, submitted verbatim |
//!
//! Numeric options are rejected (HTTP 400) when out of range, never
//! silently clamped, and validation runs before any spooler contact.

use std::io::Cursor;

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use thermo_escpos::{Align, CodePage, CutMode, EscPosBuilder, RasterMode, RasterOptions};

use super::in_range;
use super::printers::PrinterQuery;
use crate::core::{GatewayError, GatewayResult, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/print-text", post(print_text))
        .route("/print-image", post(print_image))
        .route("/print-raw", post(print_raw))
}

fn default_one() -> i64 {
    1
}
fn default_two() -> i64 {
    2
}
fn default_three() -> i64 {
    3
}
fn default_five() -> i64 {
    5
}
fn default_true() -> bool {
    true
}
fn align_center() -> Align {
    Align::Center
}

/// Feed-then-cut tail shared by text, image and the /cut endpoint
///
/// Full cuts use GS V 66 n so the printer manages cutter distance; partial
/// cuts have no feed-and-cut form, so the feed is emitted separately.
pub(crate) fn append_cut(builder: &mut EscPosBuilder, mode: CutMode, feed: u8) {
    match mode {
        CutMode::Full => {
            builder.cut_feed(feed);
        }
        CutMode::Partial => {
            if feed > 0 {
                builder.feed(feed);
            }
            builder.cut(CutMode::Partial);
        }
    }
}

// ========== POST /print-text ==========

#[derive(Debug, Deserialize)]
pub struct TextOptions {
    pub printer: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub underline: i64,
    #[serde(default = "default_one")]
    pub width: i64,
    #[serde(default = "default_one")]
    pub height: i64,
    #[serde(default = "default_two")]
    pub lines_after: i64,
    #[serde(default)]
    pub cut: bool,
    #[serde(default)]
    pub cut_mode: CutMode,
    #[serde(default = "default_three")]
    pub cut_feed: i64,
    #[serde(default)]
    pub codepage: CodePage,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct TextPrinted {
    message: &'static str,
    printer: String,
    job_id: String,
    bytes: usize,
}

async fn print_text(
    State(state): State<ServerState>,
    Query(opts): Query<TextOptions>,
    Json(body): Json<TextBody>,
) -> GatewayResult<Json<TextPrinted>> {
    let width = in_range("width", opts.width, 1, 8)?;
    let height = in_range("height", opts.height, 1, 8)?;
    let underline = in_range("underline", opts.underline, 0, 2)?;
    let lines_after = in_range("lines_after", opts.lines_after, 0, 255)?;
    let cut_feed = in_range("cut_feed", opts.cut_feed, 0, 255)?;
    if body.text.is_empty() {
        return Err(GatewayError::BadRequest("missing 'text' in body".into()));
    }

    let mut builder = EscPosBuilder::new();
    builder.codepage(opts.codepage);
    builder.align(opts.align);
    builder.bold(opts.bold);
    builder.underline(underline);
    builder.size(width, height);
    builder.text(&body.text);
    if !body.text.ends_with('\n') {
        builder.newline();
    }
    builder.reset_format();
    if lines_after > 0 {
        builder.feed(lines_after);
    }
    if opts.cut {
        append_cut(&mut builder, opts.cut_mode, cut_feed);
    }

    let data = builder.build();
    let bytes = data.len();
    let job_id = state.submit(&opts.printer, data).await?;

    Ok(Json(TextPrinted {
        message: "Text printed",
        printer: opts.printer,
        job_id,
        bytes,
    }))
}

/// Largest decoded image accepted, in pixels
///
/// A compressed PNG far under the body cap can expand to hundreds of
/// megapixels; decoding and dithering that pins a small device. Receipts are
/// at most 576 dots wide, so 4M pixels is already generous.
const MAX_IMAGE_PIXELS: u64 = 4_000_000;

/// Decode an upload, checking its declared dimensions before any pixel
/// buffer is allocated
fn decode_image(raw: &[u8]) -> Result<image::DynamicImage, GatewayError> {
    let (w, h) = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| GatewayError::BadRequest(format!("could not decode image: {e}")))?
        .into_dimensions()
        .map_err(|e| GatewayError::BadRequest(format!("could not decode image: {e}")))?;
    let pixels = u64::from(w) * u64::from(h);
    if pixels == 0 || pixels > MAX_IMAGE_PIXELS {
        return Err(GatewayError::BadRequest(format!(
            "image is {w}x{h} ({pixels} pixels); limit is {MAX_IMAGE_PIXELS} pixels"
        )));
    }

    image::load_from_memory(raw)
        .map_err(|e| GatewayError::BadRequest(format!("could not decode image: {e}")))
}

// ========== POST /print-image ==========

#[derive(Debug, Deserialize)]
pub struct ImageOptions {
    pub printer: String,
    pub max_width: Option<i64>,
    #[serde(default)]
    pub mode: RasterMode,
    #[serde(default = "align_center")]
    pub align: Align,
    #[serde(default = "default_true")]
    pub dither: bool,
    #[serde(default)]
    pub invert: bool,
    pub beep_count: Option<i64>,
    pub beep_duration: Option<i64>,
    #[serde(default = "default_five")]
    pub lines_after: i64,
    #[serde(default = "default_true")]
    pub cut: bool,
    #[serde(default)]
    pub cut_mode: CutMode,
    #[serde(default = "default_three")]
    pub cut_feed: i64,
}

#[derive(Serialize)]
pub struct ImagePrinted {
    message: &'static str,
    printer: String,
    job_id: String,
    /// Dimensions after scaling to the printable width
    image_width: u32,
    image_height: u32,
    lines_after: u8,
    cut: bool,
}

async fn print_image(
    State(state): State<ServerState>,
    Query(opts): Query<ImageOptions>,
    mut multipart: Multipart,
) -> GatewayResult<Json<ImagePrinted>> {
    let lines_after = in_range("lines_after", opts.lines_after, 0, 255)?;
    let cut_feed = in_range("cut_feed", opts.cut_feed, 0, 255)?;
    let beep = match (opts.beep_count, opts.beep_duration) {
        (None, None) => None,
        (count, duration) => Some((
            in_range("beep_count", count.unwrap_or(1), 1, 9)?,
            in_range("beep_duration", duration.unwrap_or(1), 1, 9)?,
        )),
    };
    let max_width = match opts.max_width {
        None => state.config.max_width_default,
        Some(w) if (1..=4096).contains(&w) => w as u32,
        Some(w) => {
            return Err(GatewayError::BadRequest(format!(
                "max_width must be 1-4096, got {w}"
            )));
        }
    };

    let mut image_bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            image_bytes = Some(field.bytes().await?);
            break;
        }
    }
    let Some(raw) = image_bytes else {
        return Err(GatewayError::BadRequest(
            "missing 'image' field in multipart body".into(),
        ));
    };

    let img = decode_image(&raw)?;

    let raster = thermo_escpos::render(
        &img,
        &RasterOptions {
            max_width,
            align: opts.align,
            dither: opts.dither,
            invert: opts.invert,
            mode: opts.mode,
        },
    )
    .map_err(|e| GatewayError::BadRequest(e.to_string()))?;

    let mut builder = EscPosBuilder::new();
    builder.raw(&raster.data);
    // The raster must clear the cutter before any cut lands
    let lines_after = if lines_after == 0 { 2 } else { lines_after };
    builder.feed(lines_after);
    if let Some((count, duration)) = beep {
        builder.beep(count, duration);
    }
    if opts.cut {
        append_cut(&mut builder, opts.cut_mode, cut_feed);
    }

    let job_id = state.submit(&opts.printer, builder.build()).await?;

    Ok(Json(ImagePrinted {
        message: "Image printed",
        printer: opts.printer,
        job_id,
        image_width: raster.width,
        image_height: raster.height,
        lines_after,
        cut: opts.cut,
    }))
}

// ========== POST /print-raw ==========

#[derive(Debug, Deserialize)]
pub struct RawBody {
    pub base64: Option<String>,
    pub hex: Option<String>,
}

#[derive(Serialize)]
pub struct RawSent {
    message: &'static str,
    printer: String,
    job_id: String,
    bytes: usize,
}

/// The only endpoint with no semantic validation: decoded bytes reach the
/// spooler exactly as supplied.
async fn print_raw(
    State(state): State<ServerState>,
    Query(q): Query<PrinterQuery>,
    Json(body): Json<RawBody>,
) -> GatewayResult<Json<RawSent>> {
    let data = match (&body.base64, &body.hex) {
        (Some(b64), _) => BASE64_STANDARD
            .decode(b64.trim())
            .map_err(|e| GatewayError::BadRequest(format!("invalid base64: {e}")))?,
        (None, Some(hx)) => hex::decode(hx.trim())
            .map_err(|e| GatewayError::BadRequest(format!("invalid hex: {e}")))?,
        (None, None) => {
            return Err(GatewayError::BadRequest(
                "provide 'base64' or 'hex' in body".into(),
            ));
        }
    };

    let bytes = data.len();
    let job_id = state.submit(&q.printer, data).await?;

    Ok(Json(RawSent {
        message: "Raw data sent",
        printer: q.printer,
        job_id,
        bytes,
    }))
}
