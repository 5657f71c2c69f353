//! Router tests against the bundled `data/` directory.

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use espboard_core::Dataset;
use espboard_web::create_router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let dataset = Dataset::load(&dir).expect("bundled dataset loads");
    create_router(Arc::new(dataset), None)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_views() {
    let (status, body) = get(app(), "/api/views").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "ESP Board Overview");
    assert_eq!(body[3]["link"], "ESP32-Partitions");
    assert_eq!(body[3]["kind"], "esp32_partitions");
}

#[tokio::test]
async fn test_cores() {
    let (status, body) = get(app(), "/api/cores").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["core"], "esp8266");
    assert_eq!(body[0]["version"], "3.1.2");
    assert_eq!(body[1]["view"], "esp32");
}

#[tokio::test]
async fn test_boards_unfiltered() {
    let (status, body) = get(app(), "/api/boards/esp8266").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["core_version"], "3.1.2");
    assert_eq!(body["total_count"], 4);
    assert_eq!(body["filtered_count"], 4);
    assert_eq!(body["boards"][0]["board"], "generic");
    assert_eq!(
        body["boards"][1]["pins_link"],
        "https://github.com/esp8266/Arduino/blob/3.1.2/variants/d1/pins_arduino.h"
    );
}

#[tokio::test]
async fn test_boards_filter_and_sort() {
    let (status, body) = get(
        app(),
        "/api/boards/esp8266?ignore_na=true&sort=led&direction=desc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);

    let leds: Vec<&str> = body["boards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["led_builtin"].as_str().unwrap())
        .collect();
    assert_eq!(leds, vec!["5", "2", "1"]);

    let (_, body) = get(app(), "/api/boards/esp32?filter=S3").await;
    assert_eq!(body["filtered_count"], 1);
    assert_eq!(body["boards"][0]["board"], "um_bling");
}

#[tokio::test]
async fn test_boards_unknown_core() {
    let (status, body) = get(app(), "/api/boards/rp2040").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("rp2040"));
}

#[tokio::test]
async fn test_boards_invalid_sort() {
    let (status, _) = get(app(), "/api/boards/esp32?sort=color").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app(), "/api/boards/esp32?sort=name&direction=up").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partition_boards() {
    let (status, body) = get(app(), "/api/partitions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!(["esp32c2", "um_bling", "S_ODI_Ultra"])
    );
}

#[tokio::test]
async fn test_partition_view_fallback() {
    let (status, body) = get(app(), "/api/partitions/um_bling").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_scheme"], "default_8MB");
    assert_eq!(body["entries"].as_array().unwrap().len(), 6);
    assert_eq!(body["entries"][0]["offset_dec"], 0x9000);
    assert_eq!(body["entries"][0]["color"], "#1f77b4");
}

#[tokio::test]
async fn test_partition_view_with_scheme() {
    let (status, body) = get(app(), "/api/partitions/um_bling?scheme=minimal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_scheme"], "minimal");
    assert_eq!(body["selected_build"], "minimal");
    assert_eq!(body["entries"].as_array().unwrap().len(), 5);
    assert_eq!(body["diagram"]["view_box"], "0 0 2096 100");
}

#[tokio::test]
async fn test_partition_view_unknown_board() {
    let (status, body) = get(app(), "/api/partitions/nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schemes"], serde_json::json!([]));
    assert_eq!(body["selected_scheme"], Value::Null);
    assert_eq!(body["entries"], serde_json::json!([]));
}
