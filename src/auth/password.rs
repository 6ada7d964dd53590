use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::shared::AppError;

/// Hashes a plaintext password into a salted Argon2id PHC string.
///
/// A fresh salt is drawn per call, so hashing the same password twice
/// yields different digests. Equality of digests is meaningless; only
/// `verify_password` can compare.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC digest.
///
/// Returns false on mismatch and on malformed digest input; never errors
/// outward.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
