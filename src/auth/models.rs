use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for administrator accounts.
///
/// Deliberately does not implement Serialize: the password hash must never
/// cross the HTTP boundary. `AdminPublic` is the only shape that does.
#[derive(Debug, Clone, FromRow)]
pub struct AdminModel {
    pub id: String, // UUID v4 as string
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AdminModel {
    /// Creates a new administrator with a generated ID and creation timestamp
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Projects the account down to its public fields
    pub fn public(&self) -> AdminPublic {
        AdminPublic {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of an administrator: everything except the credential
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AdminPublic {
    pub id: String,
    pub username: String,
    pub email: String,
}
