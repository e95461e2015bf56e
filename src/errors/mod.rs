//! Error handling utilities for the moodstack library.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the library, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Messages carry enough context (operation, diary id, owner id) to diagnose a
//! failure, and never include key material, passwords, or diary plaintext.

use std::io;
use thiserror::Error;

/// Represents specific error cases that can occur during cryptographic operations.
///
/// These cover key derivation, cipher construction and the random source. An
/// authenticated-decryption failure is reported separately so that callers can
/// tell "wrong key or tampered data" apart from "the crypto stack broke".
///
/// # Examples
///
/// ```
/// use moodstack::errors::CryptoError;
///
/// let error = CryptoError::InvalidKeyLength { expected: 32, actual: 16 };
/// let message = format!("{}", error);
/// assert!(message.contains("32"));
/// assert!(message.contains("16"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material handed to the cipher has the wrong size.
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Nonce read back from storage has the wrong size.
    #[error("Invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength {
        /// Required nonce length in bytes
        expected: usize,
        /// Length that was found
        actual: usize,
    },

    /// Argon2 rejected its parameters or failed to derive a key.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// AEAD sealing failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Authenticated decryption failed: wrong key, wrong password or tampered data.
    #[error("Authenticated decryption failed (wrong key or tampered data)")]
    Authentication,

    /// A stored password hash could not be parsed or produced.
    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use moodstack::errors::DatabaseError;
///
/// let error = DatabaseError::Custom("unknown encryption mode 'rot13'".to_string());
/// assert!(format!("{}", error).contains("rot13"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other moodstack instances.")]
    Pool(#[from] r2d2::Error),

    /// A JSON column could not be encoded or decoded.
    #[error("Failed to serialize column data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom database error with detailed message, e.g. a corrupt row.
    #[error("Database error: {0}")]
    Custom(String),
}

/// Represents specific error cases that can occur while talking to the
/// external inference service.
///
/// None of these ever reach the end caller of an analysis: they trigger the
/// fallback to local scoring.
///
/// # Examples
///
/// ```
/// use moodstack::errors::AIError;
///
/// let error = AIError::ModelNotFound("qwen2.5:7b".to_string());
/// assert!(format!("{}", error).contains("qwen2.5:7b"));
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// Inference API is not reachable or the request timed out.
    #[error("Ollama API error: {0}. Is Ollama running? Try: ollama serve")]
    OllamaOffline(#[source] reqwest::Error),

    /// Requested model not found on the server.
    #[error("Model not found: {0}. Try: ollama pull {0}")]
    ModelNotFound(String),

    /// Invalid or unexpected response from the API.
    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),

    /// The free-form answer did not contain a usable structured payload.
    #[error("No structured emotion payload in model response: {0}")]
    MissingPayload(String),
}

/// Represents all possible errors that can occur in the moodstack library.
///
/// This enum is the central error type used across the crate, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating an invalid argument error:
/// ```
/// use moodstack::errors::AppError;
///
/// let error = AppError::InvalidArgument("individual password is required".to_string());
/// assert_eq!(format!("{}", error), "Invalid argument: individual password is required");
/// ```
///
/// Converting from an IO error:
/// ```
/// use moodstack::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed mode, missing required password and similar caller mistakes.
    ///
    /// Raised before any cryptographic work happens.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key derivation or cipher construction failed.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Authenticated decryption of a specific diary failed.
    #[error("Failed to decrypt diary '{diary_id}' for owner {owner_id} during {operation}: wrong key or password, or the record was tampered with")]
    Decryption {
        /// The store operation that attempted the decryption
        operation: &'static str,
        /// Diary the ciphertext belongs to
        diary_id: String,
        /// Owner the lookup was scoped to
        owner_id: i64,
    },

    /// A row was missing or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Errors related to database operations.
    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors related to the external inference service.
    #[error("External service error: {0}")]
    AI(#[from] AIError),
}

impl AppError {
    /// Returns `true` when the error is an authenticated-decryption failure.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            AppError::Decryption { .. } | AppError::Crypto(CryptoError::Authentication)
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(DatabaseError::Sqlite(e))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Database(DatabaseError::Pool(e))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use moodstack::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::NotFound("diary 42".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
