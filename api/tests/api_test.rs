//! End-to-end tests against the router over an in-memory store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use docvault::{config::Config, rest, store, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "docvault-test-boundary";

async fn app_with_limit(max_upload_bytes: usize) -> Router {
    let pool = store::in_memory().await.expect("in-memory store");
    let config = Config {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test-secret".into(),
        token_ttl: Duration::days(30),
        max_upload_bytes,
        db_max_connections: 1,
    };
    rest::router(AppState::new(pool, &config))
}

async fn app() -> Router {
    app_with_limit(1024 * 1024).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn upload_request(
    token: Option<&str>,
    field: &str,
    filename: &str,
    content: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/documents/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn register(app: &Router, email: &str, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/register",
            json!({ "email": email, "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn register_login_and_wrong_password() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "a@x.com", "username": "alice", "password": "pw123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"], json!({ "email": "a@x.com", "username": "alice" }));

    let (status, body) = send(
        &app,
        post_json("/auth/login", json!({ "email": "a@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], json!({ "email": "a@x.com", "username": "alice" }));
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_with_token("/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], json!({ "email": "a@x.com", "username": "alice" }));

    let (status, body) = send(
        &app,
        post_json("/auth/login", json!({ "email": "a@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, unknown) = send(
        &app,
        post_json("/auth/login", json!({ "email": "z@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], body["message"]);
}

#[tokio::test]
async fn registration_validation_and_conflicts() {
    let app = app().await;
    register(&app, "a@x.com", "alice", "pw123").await;

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "a@x.com", "username": "other", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "b@x.com", "username": "alice", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        post_json("/auth/register", json!({ "email": "c@x.com", "username": "carol" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, post_json("/auth/login", json!({ "email": "a@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploaded_text_is_listed_for_its_owner_only() {
    let app = app().await;
    let alice = register(&app, "a@x.com", "alice", "pw123").await;
    let bob = register(&app, "b@x.com", "bob", "pw456").await;

    let (status, body) = send(
        &app,
        upload_request(Some(alice.as_str()), "file", "hello.txt", b"hello\nworld"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    let document_id = body["document_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_with_token("/api/documents", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["id"], document_id.as_str());
    assert_eq!(documents[0]["content"], "hello\nworld");
    assert_eq!(documents[0]["uploaded_by"], "a@x.com");

    let (status, body) = send(&app, get_with_token("/api/documents", &bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["documents"].as_array().unwrap().is_empty());

    let uri = format!("/api/documents/{document_id}");
    let (status, _) = send(&app, get_with_token(&uri, &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get_with_token(&uri, &bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_requires_a_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, upload_request(None, "file", "a.txt", b"hi")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, upload_request(Some("garbage"), "file", "a.txt", b"hi")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_with_token("/api/documents", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_uploads_are_client_errors() {
    let app = app().await;
    let token = register(&app, "a@x.com", "alice", "pw123").await;

    let cases: [(&str, &str, &[u8]); 4] = [
        ("file", "data.csv", b"a,b"),
        ("attachment", "a.txt", b"hi"),
        ("file", "", b"hi"),
        ("file", "bad.txt", &[0xff, 0xfe]),
    ];
    for (field, filename, content) in cases {
        let (status, _) = send(
            &app,
            upload_request(Some(token.as_str()), field, filename, content),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field} {filename:?}");
    }

    let (_, body) = send(&app, get_with_token("/api/documents", &token)).await;
    assert!(body["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let app = app_with_limit(1024).await;
    let token = register(&app, "a@x.com", "alice", "pw123").await;

    let (status, _) = send(
        &app,
        upload_request(Some(token.as_str()), "file", "big.txt", &vec![b'a'; 8 * 1024]),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
