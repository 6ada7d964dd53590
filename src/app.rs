use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth;
use crate::person;
use crate::shared::AppState;

// Matches the original upload limit; multipart bodies carry photo + CV.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Assembles the application router: public auth and registration routes,
/// token-gated record routes, and the static uploads directory.
pub fn build_router(state: AppState) -> Router {
    let uploads_dir = state.file_store.root().to_path_buf();

    let protected = Router::new()
        .route("/api/users", get(person::list_persons))
        .route("/api/users/search", get(person::search_persons))
        .route("/api/users/:id", get(person::get_person))
        .route("/api/users/:id/download-cv", get(person::download_cv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/check-admin", get(auth::check_admin))
        .route("/api/users/register", post(person::register_person))
        .route("/api/users/:id/photo", get(person::get_photo))
        .route("/api/health", get(health))
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "Server is running",
        "timestamp": Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "Server is running");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = build_router(AppStateBuilder::new().build());

        for uri in [
            "/api/users",
            "/api/users/search?query=x",
            "/api/users/some-id",
            "/api/users/some-id/download-cv",
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "expected 401 for {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_check_admin_is_public() {
        let app = build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check-admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
