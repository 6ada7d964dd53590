use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::AccountService;
use super::types::{
    CheckAdminResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for administrator registration
///
/// POST /api/auth/register
/// Returns the new account's public fields; no token is issued.
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    info!("Registering new administrator");

    let service = AccountService::new(
        Arc::clone(&state.admin_repository),
        state.token_config.clone(),
    );
    let admin = service.register(request).await?;

    info!(admin_id = %admin.id, username = %admin.username, "Administrator registered successfully");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Admin registered successfully! Please login with your credentials."
                .to_string(),
            admin,
        }),
    ))
}

/// HTTP handler for administrator login
///
/// POST /api/auth/login
/// Returns a 7-day session token plus the account's public fields.
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("Processing login");

    let service = AccountService::new(
        Arc::clone(&state.admin_repository),
        state.token_config.clone(),
    );
    let (token, admin) = service.login(request).await?;

    info!(username = %admin.username, "Login completed successfully");

    Ok(Json(LoginResponse {
        token,
        message: "Login successful".to_string(),
        admin,
    }))
}

/// HTTP handler reporting whether any administrator account exists
///
/// GET /api/auth/check-admin
/// Public; drives the first-run registration flow.
#[instrument(name = "check_admin", skip(state))]
pub async fn check_admin(
    State(state): State<AppState>,
) -> Result<Json<CheckAdminResponse>, AppError> {
    let service = AccountService::new(
        Arc::clone(&state.admin_repository),
        state.token_config.clone(),
    );
    let admin_exists = service.admin_exists().await?;

    Ok(Json(CheckAdminResponse {
        admin_exists,
        message: if admin_exists {
            "Admin exists".to_string()
        } else {
            "No admin found".to_string()
        },
    }))
}
