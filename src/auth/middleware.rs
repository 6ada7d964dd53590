use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// Bearer-token authentication middleware. Validates the Authorization
/// header and attaches `AdminClaims` to the request.
///
/// Usage: `.route_layer(middleware::from_fn_with_state(app_state.clone(), auth::require_auth))`
/// Handlers can then extract `Extension(claims): Extension<AdminClaims>`.
///
/// Tokens are self-contained: validation is signature plus expiry, with no
/// store lookup and no caching across requests.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "Authenticating request");

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::MissingToken
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not use the Bearer scheme");
        AppError::MissingToken
    })?;

    let claims = match state.token_config.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Token verification failed: {}", e);
            return Err(e);
        }
    };

    debug!(
        username = %claims.username,
        admin_id = %claims.id,
        "Authentication successful, adding claims to request"
    );

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
