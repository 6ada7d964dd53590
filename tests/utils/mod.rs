use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use dossier::auth::repository::InMemoryAdminRepository;
use dossier::auth::token::TokenConfig;
use dossier::person::repository::InMemoryPersonRepository;
use dossier::storage::FileStore;
use dossier::{build_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds an application over in-memory repositories and a throwaway
/// upload directory.
pub fn test_app() -> Router {
    let upload_dir = std::env::temp_dir().join(format!("dossier-it-{}", Uuid::new_v4()));
    let state = AppState::new(
        Arc::new(InMemoryAdminRepository::new()),
        Arc::new(InMemoryPersonRepository::new()),
        Arc::new(FileStore::new(upload_dir)),
        TokenConfig::new(TEST_SECRET),
    );
    build_router(state)
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_with_token(app: &Router, uri: &str, token: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Registers alice and returns a login token for her.
pub async fn register_and_login(app: &Router) -> String {
    let response = post_json(
        app,
        "/api/auth/register",
        r#"{"username": "alice", "password": "secret1", "confirmPassword": "secret1", "email": "a@x.com"}"#,
    )
    .await;
    assert_eq!(response.status(), 201);

    let response = post_json(
        app,
        "/api/auth/login",
        r#"{"username": "alice", "password": "secret1"}"#,
    )
    .await;
    assert_eq!(response.status(), 200);

    let json = read_json(response).await;
    json["token"].as_str().unwrap().to_string()
}
