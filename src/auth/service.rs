use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::password::{hash_password, verify_password};
use super::repository::AdminRepository;
use super::token::TokenConfig;
use super::types::{LoginRequest, RegisterRequest};
use super::models::{AdminModel, AdminPublic};
use crate::shared::AppError;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Service orchestrating the credential lifecycle: registration, login,
/// first-run existence check.
pub struct AccountService {
    repository: Arc<dyn AdminRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AdminRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Registers a new administrator account.
    ///
    /// Does not issue a token; the administrator logs in afterwards.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AdminPublic, AppError> {
        let (username, password, confirm_password, email) = match (
            request.username,
            request.password,
            request.confirm_password,
            request.email,
        ) {
            (Some(u), Some(p), Some(c), Some(e))
                if !u.is_empty() && !p.is_empty() && !c.is_empty() && !e.is_empty() =>
            {
                (u, p, c, e)
            }
            _ => {
                return Err(AppError::Validation("All fields are required".to_string()));
            }
        };

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        if password != confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if self
            .repository
            .exists_by_username_or_email(&username, &email)
            .await?
        {
            warn!(username = %username, "Registration rejected: account already exists");
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = hash_password(&password)?;
        let admin = AdminModel::new(username, email, password_hash);

        // The store's own uniqueness constraint still guards the race
        // between the existence check and this insert.
        self.repository.insert(&admin).await?;

        info!(admin_id = %admin.id, username = %admin.username, "Administrator registered");
        Ok(admin.public())
    }

    /// Authenticates an administrator and issues a session token.
    ///
    /// Unknown usernames and wrong passwords produce the identical
    /// `InvalidCredentials` failure, so responses cannot be used to
    /// enumerate accounts.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<(String, AdminPublic), AppError> {
        let (username, password) = match (request.username, request.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                return Err(AppError::Validation(
                    "Username and password are required".to_string(),
                ));
            }
        };

        let admin = match self.repository.find_with_credential(&username).await? {
            Some(admin) => admin,
            None => {
                warn!(username = %username, "Login failed: unknown username");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(&password, &admin.password_hash) {
            warn!(username = %username, "Login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let public = admin.public();
        let token = self.token_config.create_token(&public)?;

        info!(admin_id = %public.id, username = %public.username, "Login successful");
        Ok((token, public))
    }

    /// Reports whether any administrator account exists, for the first-run
    /// registration flow.
    #[instrument(skip(self))]
    pub async fn admin_exists(&self) -> Result<bool, AppError> {
        let count = self.repository.count().await?;
        Ok(count > 0)
    }
}
