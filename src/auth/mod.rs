// Public API - what other modules can use
pub use handlers::{check_admin, login, register};
pub use middleware::require_auth;
pub use types::AdminClaims;

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
