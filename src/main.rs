use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dossier::app::build_router;
use dossier::auth::repository::{InMemoryAdminRepository, PostgresAdminRepository};
use dossier::auth::token::TokenConfig;
use dossier::person::repository::{InMemoryPersonRepository, PostgresPersonRepository};
use dossier::shared::AppState;
use dossier::storage::FileStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dossier record service");

    // Signing secret is read once here and handed to the token service;
    // request handling never consults the environment.
    let token_config = TokenConfig::from_env();

    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    let file_store = Arc::new(FileStore::new(upload_dir));

    // In-memory repositories by default; PostgreSQL when DATABASE_URL is set.
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Connected to PostgreSQL");
            AppState::new(
                Arc::new(PostgresAdminRepository::new(pool.clone())),
                Arc::new(PostgresPersonRepository::new(pool)),
                file_store,
                token_config,
            )
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory repositories");
            AppState::new(
                Arc::new(InMemoryAdminRepository::new()),
                Arc::new(InMemoryPersonRepository::new()),
                file_store,
                token_config,
            )
        }
    };

    let app = build_router(app_state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind port");
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await.expect("Server error");
}
