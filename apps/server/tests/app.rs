use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use moringa::domain::config::ApiConfig;
use moringa_server::Server;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn server(cfg: ApiConfig) -> Server {
    Server::builder().config(cfg).build().await.expect("server")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn default_server_accepts_a_submission() {
    let app = server(ApiConfig::default()).await.app();

    let form = json!({ "name": "Abdi", "email": "a@b.com", "service": "erp", "message": "hi" });
    let response = app.clone().oneshot(post_json("/api/contacts", &form)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Mail is disabled by default: the contact is stored but not emailed.
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Contact submitted successfully but email failed to send");

    let response = app.oneshot(get("/api/stats")).await.expect("response");
    assert_eq!(json_body(response).await, json!({ "happyClients": 583 }));
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let app = server(ApiConfig::default()).await.app();

    let response = app.clone().oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "up");

    let response = app.oneshot(get("/docs")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut cfg = ApiConfig::default();
    cfg.server.body_limit_bytes = 1024;
    let app = server(cfg).await.app();

    let form = json!({ "name": "Abdi", "email": "a@b.com", "service": "erp", "message": "x".repeat(4096) });
    let response = app.clone().oneshot(post_json("/api/contacts", &form)).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = app.oneshot(get("/api/contacts")).await.expect("response");
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn configured_cors_origin_is_echoed() {
    let mut cfg = ApiConfig::default();
    cfg.server.cors_origins = vec!["https://moringa.co.ke".to_owned()];
    let app = server(cfg).await.app();

    let request = Request::builder()
        .uri("/api/stats")
        .header(header::ORIGIN, "https://moringa.co.ke")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some("https://moringa.co.ke")
    );

    let request = Request::builder()
        .uri("/api/stats")
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn missing_certificate_fails_the_build() {
    let mut cfg = ApiConfig::default();
    cfg.server.ssl = Some(moringa::domain::config::SslConfig {
        cert: "/nonexistent/cert.pem".into(),
        key: "/nonexistent/key.pem".into(),
    });

    let err = Server::builder().config(cfg).build().await.unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}
