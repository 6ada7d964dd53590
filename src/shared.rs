use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::repository::AdminRepository;
use crate::auth::token::TokenConfig;
use crate::person::repository::PersonRepository;
use crate::storage::FileStore;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub admin_repository: Arc<dyn AdminRepository + Send + Sync>,
    pub person_repository: Arc<dyn PersonRepository + Send + Sync>,
    pub file_store: Arc<FileStore>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        admin_repository: Arc<dyn AdminRepository + Send + Sync>,
        person_repository: Arc<dyn PersonRepository + Send + Sync>,
        file_store: Arc<FileStore>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            admin_repository,
            person_repository,
            file_store,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Username or email already registered")]
    DuplicateAccount,

    #[error("Passport number already registered")]
    DuplicateRecord,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) | AppError::DuplicateAccount | AppError::DuplicateRecord => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken(_)
            | AppError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // 500 responses surface the raw failure message (internal tool)
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
