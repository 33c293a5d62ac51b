//! Integration tests for `POST /create-video`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json, post_raw};
use rendergen_replicate::fake::{answer, ScriptedApi};
use serde_json::json;

fn app() -> axum::Router {
    build_test_app(Arc::new(ScriptedApi::new(answer(
        "p0",
        "succeeded",
        json!(["https://cdn/x.png"]),
    ))))
}

fn frames(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://cdn/frames/{i}.png")).collect()
}

#[tokio::test]
async fn returns_instructions_when_encoding_disabled() {
    let response = post_json(
        app(),
        "/create-video",
        json!({ "frameUrls": frames(16), "fps": 8 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["frameCount"], 16);
    assert_eq!(body["fps"], 8);
    assert_eq!(body["durationSecs"], 2.0);
    assert_eq!(body["frameUrls"].as_array().unwrap().len(), 16);
    assert!(body["instructions"][1].as_str().unwrap().contains("-framerate 8"));
}

#[tokio::test]
async fn fps_defaults_to_eight() {
    let response = post_json(app(), "/create-video", json!({ "frameUrls": frames(4) })).await;
    let body = body_json(response).await;
    assert_eq!(body["fps"], 8);
    assert_eq!(body["durationSecs"], 0.5);
}

#[tokio::test]
async fn empty_frame_list_is_rejected() {
    let response = post_json(app(), "/create-video", json!({ "frameUrls": [], "fps": 8 })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn out_of_range_fps_is_rejected() {
    for fps in [json!(0), json!(61), json!(7.5)] {
        let response = post_json(
            app(),
            "/create-video",
            json!({ "frameUrls": frames(2), "fps": fps }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "fps {fps}");
    }
}

#[tokio::test]
async fn too_many_frames_are_rejected() {
    let response = post_json(app(), "/create-video", json!({ "frameUrls": frames(241) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let response = post_raw(
        app(),
        "/create-video",
        "application/json",
        b"{\"frameUrls\": [".to_vec(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
