use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{AdminModel, AdminPublic};
use crate::shared::AppError;

/// Trait for administrator credential storage.
///
/// The password hash is excluded from every read except
/// `find_with_credential`, which exists solely for the login path.
#[async_trait]
pub trait AdminRepository {
    /// Persists a new administrator. Username and email uniqueness is
    /// enforced atomically by the store; a violation fails with
    /// `DuplicateAccount`.
    async fn insert(&self, admin: &AdminModel) -> Result<(), AppError>;

    /// Looks up an administrator by username, public fields only
    async fn find_public(&self, username: &str) -> Result<Option<AdminPublic>, AppError>;

    /// Looks up an administrator by username including the password hash
    async fn find_with_credential(&self, username: &str)
        -> Result<Option<AdminModel>, AppError>;

    /// Single existence query covering both unique fields
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError>;

    /// Number of administrator accounts on record
    async fn count(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of AdminRepository for development and testing
///
/// Uniqueness is enforced under a single lock, so concurrent registrations
/// of the same username resolve with exactly one winner, matching the
/// database's unique-index semantics.
pub struct InMemoryAdminRepository {
    admins: Mutex<HashMap<String, AdminModel>>,
}

impl Default for InMemoryAdminRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAdminRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            admins: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated accounts
    pub fn with_admins(admins: Vec<AdminModel>) -> Self {
        let mut map = HashMap::new();
        for admin in admins {
            map.insert(admin.id.clone(), admin);
        }

        Self {
            admins: Mutex::new(map),
        }
    }

    /// Returns the current number of accounts in the repository
    pub fn admin_count(&self) -> usize {
        self.admins.lock().unwrap().len()
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    #[instrument(skip(self, admin))]
    async fn insert(&self, admin: &AdminModel) -> Result<(), AppError> {
        debug!(username = %admin.username, "Creating administrator in memory");

        let mut admins = self.admins.lock().unwrap();
        let taken = admins
            .values()
            .any(|a| a.username == admin.username || a.email == admin.email);
        if taken {
            warn!(username = %admin.username, "Username or email already taken");
            return Err(AppError::DuplicateAccount);
        }
        admins.insert(admin.id.clone(), admin.clone());

        debug!(admin_id = %admin.id, "Administrator created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_public(&self, username: &str) -> Result<Option<AdminPublic>, AppError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins
            .values()
            .find(|a| a.username == username)
            .map(AdminModel::public))
    }

    #[instrument(skip(self))]
    async fn find_with_credential(
        &self,
        username: &str,
    ) -> Result<Option<AdminModel>, AppError> {
        debug!(username = %username, "Fetching administrator with credential from memory");

        let admins = self.admins.lock().unwrap();
        Ok(admins.values().find(|a| a.username == username).cloned())
    }

    #[instrument(skip(self))]
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins
            .values()
            .any(|a| a.username == username || a.email == email))
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.admins.lock().unwrap().len() as u64)
    }
}

/// PostgreSQL implementation of the administrator repository.
///
/// Expects unique indexes on `admins.username` and `admins.email`; the
/// index violation is what makes concurrent duplicate registrations
/// resolve atomically.
pub struct PostgresAdminRepository {
    pool: PgPool,
}

impl PostgresAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            AppError::DuplicateAccount
        }
        _ => AppError::Database(e.to_string()),
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    #[instrument(skip(self, admin))]
    async fn insert(&self, admin: &AdminModel) -> Result<(), AppError> {
        debug!(username = %admin.username, "Creating administrator in database");

        sqlx::query(
            "INSERT INTO admins (id, username, email, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&admin.id)
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create administrator in database");
            map_insert_error(e)
        })?;

        debug!(admin_id = %admin.id, "Administrator created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_public(&self, username: &str) -> Result<Option<AdminPublic>, AppError> {
        sqlx::query_as::<_, AdminPublic>(
            "SELECT id, username, email FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch administrator from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_with_credential(
        &self,
        username: &str,
    ) -> Result<Option<AdminModel>, AppError> {
        debug!(username = %username, "Fetching administrator with credential from database");

        sqlx::query_as::<_, AdminModel>(
            "SELECT id, username, email, password_hash, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch administrator from database");
            AppError::Database(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to check administrator existence");
            AppError::Database(e.to_string())
        })?;

        Ok(row.0)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count administrators");
                AppError::Database(e.to_string())
            })?;

        Ok(row.0 as u64)
    }
}
