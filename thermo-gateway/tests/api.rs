//! End-to-end API tests against the full router with a recording backend.
//!
//! No CUPS install is needed: the fake backend scripts queue states and
//! records every spooler interaction, so validation precedence and payload
//! round-trips can be asserted byte for byte.

use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use thermo_gateway::api;
use thermo_gateway::backend::{QueueState, RecordingBackend};
use thermo_gateway::{Config, ServerState};

fn ready_backend() -> Arc<RecordingBackend> {
    let backend = RecordingBackend::new();
    backend.set_queue("FRONT", QueueState::ready());
    backend.set_queue("KITCHEN", QueueState::ready());
    Arc::new(backend)
}

fn app_with(backend: Arc<RecordingBackend>, api_key: Option<&str>) -> Router {
    let config = Config::with_overrides([("front", "FRONT"), ("kitchen", "KITCHEN")], api_key);
    let state = ServerState::with_backend(config, backend);
    api::build_app(&state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

// ========== Health ==========

#[tokio::test]
async fn health_reports_printers_and_backend() {
    let app = app_with(ready_backend(), None);
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["printers"], serde_json::json!(["front", "kitchen"]));
    assert!(body["backend"].as_str().unwrap().contains("recording"));
}

#[tokio::test]
async fn root_aliases_health() {
    let app = app_with(ready_backend(), None);
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
}

// ========== Printer status precedence ==========

#[tokio::test]
async fn status_ready() {
    let app = app_with(ready_backend(), None);
    let (status, body) = get(app, "/printer-status?printer=front").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["queue"], "FRONT");
}

#[tokio::test]
async fn status_unconfigured_never_touches_backend() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = get(app, "/printer-status?printer=unknown_printer").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "unconfigured_printer");
    assert_eq!(backend.invocation_count(), 0);
}

#[tokio::test]
async fn status_not_found_carries_lpadmin_fix() {
    let backend = Arc::new(RecordingBackend::new());
    let app = app_with(backend, None);
    let (status, body) = get(app, "/printer-status?printer=front").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "not_found");
    assert!(body["fix"].as_str().unwrap().contains("lpadmin -p FRONT"));
}

#[tokio::test]
async fn status_disabled_carries_cupsenable_fix() {
    let backend = Arc::new(RecordingBackend::new());
    backend.set_queue(
        "FRONT",
        QueueState {
            enabled: false,
            accepting: true,
        },
    );
    let app = app_with(backend, None);
    let (status, body) = get(app, "/printer-status?printer=front").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "disabled");
    assert_eq!(body["fix"], "cupsenable FRONT");
}

#[tokio::test]
async fn status_not_accepting_carries_cupsaccept_fix() {
    let backend = Arc::new(RecordingBackend::new());
    backend.set_queue(
        "FRONT",
        QueueState {
            enabled: true,
            accepting: false,
        },
    );
    let app = app_with(backend, None);
    let (status, body) = get(app, "/printer-status?printer=front").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_accepting");
    assert_eq!(body["fix"], "cupsaccept FRONT");
}

#[tokio::test]
async fn status_disabled_takes_precedence_over_not_accepting() {
    let backend = Arc::new(RecordingBackend::new());
    backend.set_queue(
        "FRONT",
        QueueState {
            enabled: false,
            accepting: false,
        },
    );
    let app = app_with(backend, None);
    let (_, body) = get(app, "/printer-status?printer=front").await;

    assert_eq!(body["status"], "disabled");
}

#[tokio::test]
async fn status_reflects_queue_removed_at_runtime() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, _) = get(app, "/printer-status?printer=front").await;
    assert_eq!(status, StatusCode::OK);

    backend.remove_queue("FRONT");
    let app = app_with(backend, None);
    let (status, body) = get(app, "/printer-status?printer=front").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "not_found");
}

// ========== List printers ==========

#[tokio::test]
async fn list_printers_shows_config_and_cups_queues() {
    let app = app_with(ready_backend(), None);
    let (status, body) = get(app, "/list-printers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["printers"][0]["name"], "front");
    assert_eq!(body["printers"][0]["queue"], "FRONT");
    assert_eq!(body["cups_queues"], serde_json::json!(["FRONT", "KITCHEN"]));
}

// ========== Print text ==========

#[tokio::test]
async fn print_text_submits_escpos_job() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = post_json(
        app,
        "/print-text?printer=front&bold=true&width=2&height=2",
        serde_json::json!({"text": "hello"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["printer"], "front");
    assert_eq!(body["job_id"], "FRONT-1");

    let jobs = backend.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].queue, "FRONT");
    // Starts with printer init, carries the text
    assert_eq!(&jobs[0].data[..2], &[0x1B, 0x40]);
    assert!(
        jobs[0]
            .data
            .windows(5)
            .any(|w| w == b"hello"),
        "job must contain the text bytes"
    );
}

#[tokio::test]
async fn print_text_width_out_of_range_is_rejected_before_backend() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = post_json(
        app,
        "/print-text?printer=front&width=9",
        serde_json::json!({"text": "hello"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
    assert_eq!(backend.invocation_count(), 0);
}

#[tokio::test]
async fn print_text_unconfigured_submits_nothing() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = post_json(
        app,
        "/print-text?printer=ghost",
        serde_json::json!({"text": "hello"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "unconfigured_printer");
    assert_eq!(backend.invocation_count(), 0);
}

#[tokio::test]
async fn print_text_empty_text_is_rejected() {
    let app = app_with(ready_backend(), None);
    let (status, body) = post_json(
        app,
        "/print-text?printer=front",
        serde_json::json!({"text": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
}

#[tokio::test]
async fn print_text_cut_appends_cut_sequence() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, _) = post_json(
        app,
        "/print-text?printer=front&cut=true&cut_mode=full&cut_feed=4",
        serde_json::json!({"text": "bye"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &backend.jobs()[0].data;
    assert_eq!(&data[data.len() - 4..], &[0x1D, 0x56, 0x42, 4]);
}

// ========== Raw passthrough ==========

#[tokio::test]
async fn raw_base64_round_trips_byte_for_byte() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let payload: Vec<u8> = vec![0x1B, 0x40, 0x00, 0xFF, 0x7F, 0x0A];
    let encoded = BASE64_STANDARD.encode(&payload);

    let (status, body) = post_json(
        app,
        "/print-raw?printer=kitchen",
        serde_json::json!({"base64": encoded}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bytes"], payload.len());
    let jobs = backend.jobs();
    assert_eq!(jobs[0].queue, "KITCHEN");
    assert_eq!(jobs[0].data, payload);
}

#[tokio::test]
async fn raw_hex_round_trips_byte_for_byte() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);

    let (status, _) = post_json(
        app,
        "/print-raw?printer=front",
        serde_json::json!({"hex": "1b4200ff"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.jobs()[0].data, vec![0x1B, 0x42, 0x00, 0xFF]);
}

#[tokio::test]
async fn raw_invalid_base64_never_reaches_spooler() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);

    let (status, body) = post_json(
        app,
        "/print-raw?printer=front",
        serde_json::json!({"base64": "%%% not base64 %%%"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
    assert!(backend.jobs().is_empty());
}

#[tokio::test]
async fn raw_without_payload_is_rejected() {
    let app = app_with(ready_backend(), None);
    let (status, body) =
        post_json(app, "/print-raw?printer=front", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
}

// ========== Control endpoints ==========

#[tokio::test]
async fn beep_emits_exact_command() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = get(app, "/beep?printer=front&count=2&duration=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_units_100ms"], 3);
    assert_eq!(backend.jobs()[0].data, vec![0x1B, 0x42, 2, 3]);
}

#[tokio::test]
async fn beep_out_of_range_is_rejected_before_any_command() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = get(app, "/beep?printer=front&count=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");

    let app = app_with(backend.clone(), None);
    let (status, _) = get(app, "/beep?printer=front&duration=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(backend.invocation_count(), 0);
}

#[tokio::test]
async fn cut_partial_feeds_then_cuts() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, _) = get(app, "/cut?printer=front&feed=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.jobs()[0].data, vec![0x1B, 0x64, 2, 0x1D, 0x56, 0x01]);
}

#[tokio::test]
async fn feed_emits_line_feed_command() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = get(app, "/feed?printer=front&lines=7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"], 7);
    assert_eq!(backend.jobs()[0].data, vec![0x1B, 0x64, 7]);
}

#[tokio::test]
async fn drawer_pulse_on_pin_five() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, body) = get(app, "/drawer?printer=front&pin=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pin"], 1);
    assert_eq!(backend.jobs()[0].data, vec![0x1B, 0x70, 1, 100, 100]);
}

#[tokio::test]
async fn drawer_rejects_unknown_pin() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let (status, _) = get(app, "/drawer?printer=front&pin=2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.invocation_count(), 0);
}

// ========== Print image ==========

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([0, 0, 0]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn multipart_request(uri: &str, field: &str, filename: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "thermoboundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn print_image_rasters_and_submits() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let req = multipart_request(
        "/print-image?printer=front&dither=false",
        "image",
        "logo.png",
        &png_bytes(16, 8),
    );
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_width"], 16);
    assert_eq!(body["image_height"], 8);

    let data = &backend.jobs()[0].data;
    assert_eq!(&data[..2], &[0x1B, 0x40]);
    // Raster header appears after init + center alignment
    assert!(
        data.windows(4).any(|w| w == [0x1D, 0x76, 0x30, 0x00]),
        "job must contain a GS v 0 header"
    );
}

#[tokio::test]
async fn print_image_undecodable_payload_is_rejected() {
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let req = multipart_request(
        "/print-image?printer=front",
        "image",
        "junk.bin",
        b"definitely not an image",
    );
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
    assert!(backend.jobs().is_empty());
}

#[tokio::test]
async fn print_image_rejects_huge_pixel_dimensions_before_decoding() {
    // Compact on the wire, 9 megapixels decoded - must be refused up front
    let backend = ready_backend();
    let app = app_with(backend.clone(), None);
    let req = multipart_request(
        "/print-image?printer=front",
        "image",
        "bomb.png",
        &png_bytes(3000, 3000),
    );
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("pixels"));
    assert!(backend.jobs().is_empty());
}

#[tokio::test]
async fn print_image_missing_field_is_rejected() {
    let app = app_with(ready_backend(), None);
    let req = multipart_request(
        "/print-image?printer=front",
        "attachment",
        "logo.png",
        &png_bytes(4, 4),
    );
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
}

// ========== Upload limit ==========

#[tokio::test]
async fn declared_oversize_body_is_rejected_with_413() {
    let app = app_with(ready_backend(), None);
    let req = Request::post("/print-raw?printer=front")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, "999999999")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "upload_too_large");
}

// ========== API key ==========

#[tokio::test]
async fn api_key_required_when_configured() {
    let backend = ready_backend();

    let app = app_with(backend.clone(), Some("sekret"));
    let (status, body) = get(app, "/beep?printer=front").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "unauthorized");

    let app = app_with(backend.clone(), Some("sekret"));
    let req = Request::get("/beep?printer=front")
        .header("x-api-key", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(backend.jobs().is_empty());

    let app = app_with(backend.clone(), Some("sekret"));
    let req = Request::get("/beep?printer=front")
        .header("x-api-key", "sekret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.jobs().len(), 1);
}

#[tokio::test]
async fn health_is_exempt_from_api_key() {
    let app = app_with(ready_backend(), Some("sekret"));
    let (status, _) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
