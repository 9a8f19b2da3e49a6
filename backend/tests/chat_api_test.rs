//! End-to-end tests of the chat HTTP surface
//!
//! Requests go through the real router, backed by stores in a temp directory.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use tempchat_backend::api;
use tempchat_backend::config::Config;
use tempchat_backend::state::AppState;
use tempchat_backend::status::{Lifecycle, ServiceState};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const BOUNDARY: &str = "tempchat-test-boundary";

/// Router plus the temp directory that must outlive it
fn create_test_app() -> (TempDir, Router, Lifecycle) {
    create_test_app_with(&[])
}

/// Same as `create_test_app`, with extra configuration values
fn create_test_app_with(extra: &[(&str, &str)]) -> (TempDir, Router, Lifecycle) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let page = temp_dir.path().join("index.html");
    std::fs::write(&page, "<html><body>chat page</body></html>").unwrap();

    let mut vars: HashMap<&str, String> = HashMap::from([
        ("DATA_DIR", temp_dir.path().to_string_lossy().to_string()),
        ("PAGE_FILE", page.to_string_lossy().to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(*key, value.to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned());

    let lifecycle = Lifecycle::new();
    let state = AppState::from_config(&config, lifecycle.clone()).expect("stores should open");
    (temp_dir, api::router(state), lifecycle)
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_request(parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload_photo")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/post")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn transcript(app: &Router) -> String {
    let (status, body) = send(app, get("/messages")).await;
    assert_eq!(status, StatusCode::OK);
    String::from_utf8(body).unwrap()
}

#[tokio::test]
async fn test_fresh_store_has_empty_transcript() {
    let (_dir, app, _) = create_test_app();

    let response = app.clone().oneshot(get("/messages")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_post_text_appends_line() {
    let (_dir, app, _) = create_test_app();

    let (status, body) = send(&app, post_json(r#"{"msg": "hello", "username": "Bob"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"status": "ok"}));

    send(&app, post_json(r#"{"msg": "second"}"#)).await;

    assert_eq!(transcript(&app).await, "Bob : hello\nAnon : second\n");
}

#[tokio::test]
async fn test_post_text_without_json_content_type() {
    let (_dir, app, _) = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/post")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"msg": "still parsed"}"#))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(transcript(&app).await, "Anon : still parsed\n");
}

#[tokio::test]
async fn test_blank_and_malformed_posts_are_ok_and_write_nothing() {
    let (_dir, app, _) = create_test_app();

    for body in [r#"{"msg": ""}"#, r#"{"msg": "   "}"#, r#"{"other": 1}"#, "{{{"] {
        let (status, response) = send(&app, post_json(body)).await;
        assert_eq!(status, StatusCode::OK, "{:?}", body);
        assert_eq!(
            serde_json::from_slice::<Value>(&response).unwrap(),
            json!({"status": "ok"})
        );
    }

    assert_eq!(transcript(&app).await, "");
}

#[tokio::test]
async fn test_upload_photo_scenario() {
    let (_dir, app, _) = create_test_app();
    let photo_bytes: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();

    let request = multipart_request(&[
        Part::Text("username", "Alice"),
        Part::Text("caption", "sunset"),
        Part::File("photo", "beach.jpg", &photo_bytes),
    ]);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["status"], "ok");
    let media_ref = response["filename"].as_str().unwrap().to_string();
    let (stem, extension) = media_ref.split_once('.').unwrap();
    assert_eq!(extension, "jpg");
    assert_eq!(stem.len(), 32);
    assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(
        transcript(&app).await,
        format!("Alice : [photo]{}|sunset\n", media_ref)
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/photos/{}", media_ref)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.to_vec(), photo_bytes);
}

#[tokio::test]
async fn test_upload_photo_defaults_author_and_caption() {
    let (_dir, app, _) = create_test_app();

    let request = multipart_request(&[Part::File("photo", "cat.png", b"png bytes")]);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&body).unwrap();
    let media_ref = response["filename"].as_str().unwrap();
    assert!(media_ref.ends_with(".png"));
    assert_eq!(transcript(&app).await, format!("Anon : [photo]{}\n", media_ref));
}

#[tokio::test]
async fn test_upload_without_photo_is_rejected() {
    let (_dir, app, _) = create_test_app();

    let request = multipart_request(&[
        Part::Text("username", "Alice"),
        Part::Text("caption", "no file here"),
    ]);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({"status": "error", "msg": "No file uploaded"})
    );
    assert_eq!(transcript(&app).await, "");
}

#[tokio::test]
async fn test_upload_with_empty_photo_is_rejected() {
    let (_dir, app, _) = create_test_app();

    let request = multipart_request(&[Part::File("photo", "empty.jpg", b"")]);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap()["msg"],
        "No file uploaded"
    );
    assert_eq!(transcript(&app).await, "");
}

#[tokio::test]
async fn test_non_multipart_upload_is_rejected_as_json() {
    let (_dir, app, _) = create_test_app();
    send(&app, post_json(r#"{"msg": "before", "username": "Bob"}"#)).await;

    for (content_type, body) in [
        ("application/x-www-form-urlencoded", "username=Alice&caption=sunset"),
        ("application/json", r#"{"username": "Alice"}"#),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/upload_photo")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, response) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", content_type);
        assert_eq!(
            serde_json::from_slice::<Value>(&response).unwrap(),
            json!({"status": "error", "msg": "No file uploaded"})
        );
    }

    let request = Request::builder()
        .method("POST")
        .uri("/upload_photo")
        .body(Body::empty())
        .unwrap();
    let (status, response) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_slice::<Value>(&response).unwrap()["msg"],
        "No file uploaded"
    );

    assert_eq!(transcript(&app).await, "Bob : before\n");
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let (dir, app, _) = create_test_app_with(&[("MAX_BODY_BYTES", "1024")]);
    let photo_bytes = vec![7u8; 8 * 1024];

    let request = multipart_request(&[
        Part::File("photo", "big.jpg", &photo_bytes),
        Part::Text("username", "Alice"),
    ]);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["status"], "error");
    assert_eq!(transcript(&app).await, "");
    let stored = std::fs::read_dir(dir.path().join("photos")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_unknown_photo_is_not_found() {
    let (_dir, app, _) = create_test_app();

    let (status, body) = send(&app, get("/photos/0123456789abcdef0123456789abcdef.jpg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["status"], "error");
}

#[tokio::test]
async fn test_photo_path_cannot_escape_media_dir() {
    let (_dir, app, _) = create_test_app();
    send(&app, post_json(r#"{"msg": "private"}"#)).await;

    let (status, _) = send(&app, get("/photos/..%2Fchat.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_serves_page() {
    let (_dir, app, _) = create_test_app();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<html><body>chat page</body></html>");
}

#[tokio::test]
async fn test_health_reports_lifecycle() {
    let (_dir, app, lifecycle) = create_test_app();

    let (_, body) = send(&app, get("/api/health")).await;
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["lifecycle"], "starting");

    lifecycle.transition(ServiceState::Online).await;
    let (_, body) = send(&app, get("/api/health")).await;
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["lifecycle"], "online");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_each_appear_once() {
    let (_dir, app, _) = create_test_app();
    const POSTS: usize = 40;

    let mut handles = Vec::new();
    for i in 0..POSTS {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"msg": "post number {}", "username": "u{}"}}"#, i, i);
            let (status, _) = send(&app, post_json(&body)).await;
            assert_eq!(status, StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let text = transcript(&app).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), POSTS);
    for i in 0..POSTS {
        let expected = format!("u{} : post number {}", i, i);
        assert_eq!(lines.iter().filter(|l| **l == expected).count(), 1);
    }
}
