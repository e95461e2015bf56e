//! Password hashing for the authentication layer.
//!
//! Produces self-describing PHC strings (`$argon2id$v=19$m=...`) so that
//! verification reads its cost parameters from the stored hash.

use crate::crypto::cipher::generate_salt;
use crate::crypto::kdf::KdfParams;
use crate::errors::CryptoError;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use tracing::debug;

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str, params: &KdfParams) -> Result<String, CryptoError> {
    let salt_bytes = generate_salt();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

    let argon2 = params.argon2()?;
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

    debug!("Hashed password with {}", params);
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// Returns `Ok(false)` for a wrong password and an error only when the stored
/// hash itself is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, CryptoError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(CryptoError::PasswordHash(e.to_string())),
    }
}
