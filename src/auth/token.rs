use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument, warn};

use super::models::AdminPublic;
use super::types::AdminClaims;
use crate::shared::AppError;

/// Fallback used when JWT_SECRET is unset. Keeps development environments
/// working; a standing weakness, surfaced with a warning at startup.
const DEFAULT_SECRET: &str = "default_jwt_secret_key_change_in_production";

/// Session tokens expire exactly seven days after issuance.
const TOKEN_TTL_DAYS: i64 = 7;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_days: TOKEN_TTL_DAYS,
        }
    }

    /// Reads the signing secret from JWT_SECRET once at startup.
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                warn!("JWT_SECRET is not set, falling back to the insecure default signing secret");
                DEFAULT_SECRET.to_string()
            }
        };
        Self::new(secret)
    }

    /// Creates a signed session token embedding the administrator identity
    #[instrument(skip(self, admin))]
    pub fn create_token(&self, admin: &AdminPublic) -> Result<String, AppError> {
        self.create_token_at(admin, Utc::now())
    }

    /// Issuance with an explicit clock, so expiry behavior is testable
    pub(crate) fn create_token_at(
        &self,
        admin: &AdminPublic,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            username = %admin.username,
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating JWT token"
        );

        let claims = AdminClaims {
            id: admin.id.clone(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal(format!("Failed to sign token: {e}"))
        })
    }

    /// Validates a JWT token and returns the claims if valid.
    ///
    /// Expired-but-well-signed tokens fail with `ExpiredToken`; everything
    /// else (bad signature, malformed structure) fails with `InvalidToken`.
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                username = %data.claims.username,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken(e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_admin() -> AdminPublic {
        AdminPublic {
            id: "admin-id".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("test-secret");
        let token = config.create_token(&test_admin()).unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.id, "admin-id");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expires_after_seven_days() {
        let config = TokenConfig::new("test-secret");
        let token = config.create_token(&test_admin()).unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, (7 * 24 * 60 * 60) as usize);
    }

    #[test]
    fn test_expired_token_is_rejected_as_expired() {
        let config = TokenConfig::new("test-secret");

        // Issued eight days ago, so it expired yesterday
        let backdated = Utc::now() - Duration::days(8);
        let token = config.create_token_at(&test_admin(), backdated).unwrap();

        let result = config.validate_token(&token);
        assert!(matches!(result, Err(AppError::ExpiredToken)));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let config = TokenConfig::new("test-secret");
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let config = TokenConfig::new("test-secret");
        let token = config.create_token(&test_admin()).unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'Q' { 'A' } else { 'Q' });

        let result = config.validate_token(&tampered);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_token_from_different_secret_is_rejected() {
        let issuing = TokenConfig::new("secret-one");
        let verifying = TokenConfig::new("secret-two");

        let token = issuing.create_token(&test_admin()).unwrap();
        assert!(issuing.validate_token(&token).is_ok());

        let result = verifying.validate_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }
}
