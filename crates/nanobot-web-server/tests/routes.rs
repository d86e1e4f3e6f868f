use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use nanobot_web_core::{Session, Settings, TokenCodec};
use nanobot_web_server::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn settings() -> Settings {
    Settings {
        secret_key: "route-test-secret".to_string(),
        ..Settings::default()
    }
}

fn app() -> Router {
    router(AppState::new(settings()))
}

fn token() -> String {
    TokenCodec::from_settings(&settings())
        .issue(&Session::new("10.1.2.3", 2222, "deploy", "pw"))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, bearer: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_me_requires_token() {
    let (status, body) = send(get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn test_me_returns_session_without_password() {
    let (status, body) = send(get("/api/auth/me", Some(&token()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "host": "10.1.2.3", "port": 2222, "username": "deploy" }));
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let mut forged = token();
    forged.push('x');
    let (status, body) = send(get("/api/auth/me", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired token");
}

#[tokio::test]
async fn test_remote_routes_require_token() {
    for uri in ["/api/config", "/api/skills", "/api/cron", "/api/dashboard"] {
        let (status, _) = send(get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_schedule_kind_rejected_before_connecting() {
    let body = json!({
        "name": "weekly report",
        "message": "summarize",
        "schedule_type": "weekly",
        "schedule_value": 7
    });
    let (status, _) = send(post_json("/api/cron", Some(&token()), &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_connectivity_requires_host() {
    let (status, body) = send(post_json("/api/test-connectivity", None, &json!({ "host": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Host is required");
}

#[tokio::test]
async fn test_connectivity_reports_every_common_port() {
    let (status, body) = send(post_json("/api/test-connectivity", None, &json!({ "host": "127.0.0.1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["host"], "127.0.0.1");
    let results = body["results"].as_object().unwrap();
    assert_eq!(results.len(), 9);
    assert!(results.contains_key("22"));
    assert!(results.contains_key("2288"));
    assert!(body["suggestion"].is_string());
}

#[tokio::test]
async fn test_login_to_closed_port_suggests_remedies() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let body = json!({ "host": "127.0.0.1", "port": port, "username": "root", "password": "pw" });
    let (status, body) = send(post_json("/api/auth/login", None, &body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Cannot connect to 127.0.0.1:"), "{detail}");
    assert!(detail.contains("\n\nSuggestions:\n• "), "{detail}");
}

#[tokio::test]
async fn test_login_without_host_or_default() {
    let (status, body) = send(post_json("/api/auth/login", None, &json!({ "password": "pw" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Host is required");
}
