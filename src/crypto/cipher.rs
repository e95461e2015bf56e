//! AES-256-GCM cipher operations.
//!
//! Every call to [`seal`] draws a new nonce from the operating system's CSPRNG,
//! so a nonce is never derived from content and never reused under a key.

use crate::constants::{KEY_SIZE, NONCE_SIZE, SALT_SIZE};
use crate::errors::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

/// Ciphertext (with the 16-byte tag appended) and the nonce it was sealed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

/// Generate cryptographically secure random bytes.
fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random per-record salt.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    random_bytes()
}

/// Generate a random AES-GCM nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    random_bytes()
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` if `key` is not 32 bytes, or
/// `CryptoError::Encryption` if the cipher refuses the input.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = build_cipher(key)?;
    let nonce = generate_nonce();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption("AES-GCM encryption failed".to_string()))?;

    Ok(Sealed { ciphertext, nonce })
}

/// Decrypt and authenticate ciphertext produced by [`seal`].
///
/// # Errors
///
/// Returns `CryptoError::Authentication` when the key or nonce is wrong or the
/// ciphertext was modified. Malformed key or nonce lengths are reported as
/// their own variants before decryption is attempted.
pub fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = build_cipher(key)?;
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Authentication)
}
