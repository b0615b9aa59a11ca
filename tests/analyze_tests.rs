// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload analysis proxy tests against a fake bias detection service.

use axum::{
    body::Body,
    extract::Multipart,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use biasbounty_gateway::config::Config;
use biasbounty_gateway::db::SupabaseDb;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::MultipartBody;

/// Build the gateway against a fake bias service serving `upstream`.
async fn app_with_upstream(upstream: Router, timeout: Duration) -> (Router, String) {
    let bias_url = common::spawn_server(upstream).await;
    let config = Config {
        bias_api_url: bias_url.clone(),
        analysis_timeout: timeout,
        ..Config::test_default()
    };
    let (app, _state) = common::create_test_app_with(config, SupabaseDb::new_mock());
    (app, bias_url)
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, MultipartBody::content_type())
        .body(Body::from(body))
        .unwrap()
}

fn csv_upload() -> Vec<u8> {
    MultipartBody::new()
        .file("file", "hr.csv", "text/csv", b"gender,salary\nF,100\nM,120\n")
        .finish()
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let (app, _state) = common::create_test_app();

    let body = MultipartBody::new().text("note", "no file here").finish();
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "No file provided");
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"file": "x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_relative_download_url_is_made_absolute() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|| async {
            Json(json!({
                "bias_score": 37.5,
                "analysis_type": "tabular",
                "download_url": "/download/job-42"
            }))
        }),
    );
    let (app, bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["bias_score"], 37.5);
    assert_eq!(
        json["download_url"],
        format!("{}/download/job-42", bias_url)
    );
}

#[tokio::test]
async fn test_absolute_download_url_is_untouched() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|| async { Json(json!({"download_url": "https://files.example.com/job.csv"})) }),
    );
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["download_url"], "https://files.example.com/job.csv");
}

#[tokio::test]
async fn test_file_is_forwarded_with_name_and_content() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|mut multipart: Multipart| async move {
            while let Some(field) = multipart.next_field().await.unwrap() {
                if field.name() == Some("file") {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.unwrap();
                    return Json(json!({
                        "file_name": file_name,
                        "content_type": content_type,
                        "content": String::from_utf8_lossy(&data),
                    }));
                }
            }
            Json(json!({"file_name": null}))
        }),
    );
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["file_name"], "hr.csv");
    assert_eq!(json["content_type"], "text/csv");
    assert_eq!(json["content"], "gender,salary\nF,100\nM,120\n");
}

#[tokio::test]
async fn test_upstream_failure_status_and_message_are_relayed() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not parse CSV: inconsistent column count",
            )
        }),
    );
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = common::body_json(response).await;
    assert_eq!(
        json["error"],
        "Could not parse CSV: inconsistent column count"
    );
}

#[tokio::test]
async fn test_upstream_failure_without_body_uses_generic_message() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Upstream analysis failed");
}

#[tokio::test]
async fn test_slow_upstream_times_out_with_model_loading_message() {
    let upstream = Router::new().route(
        "/analyze-upload",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!({"bias_score": 1.0}))
        }),
    );
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_millis(200)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = common::body_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("Analysis timeout."));
    assert!(message.contains("loading AI models"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_internal_error() {
    // Config::test_default points the bias service at a closed port.
    let (app, _state) = common::create_test_app();

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Failed to analyze dataset");
}

#[tokio::test]
async fn test_invalid_upstream_json_is_internal_error() {
    let upstream = Router::new().route("/analyze-upload", post(|| async { "not json" }));
    let (app, _bias_url) = app_with_upstream(upstream, Duration::from_secs(5)).await;

    let response = app.oneshot(upload_request(csv_upload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Failed to analyze dataset");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let config = Config {
        max_upload_bytes: 64,
        ..Config::test_default()
    };
    let (app, _state) = common::create_test_app_with(config, SupabaseDb::new_mock());

    let body = MultipartBody::new()
        .file("file", "big.csv", "text/csv", &[b'a'; 1024])
        .finish();
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert!(response.status().is_client_error());
}
