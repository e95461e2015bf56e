//! Argon2id key derivation.
//!
//! Individual-mode diaries derive their content key from a password and a
//! per-record salt. The Argon2 cost parameters are stored next to the salt so
//! a record stays readable if the defaults are raised later.

use crate::constants::{KEY_SIZE, REDACTED_PLACEHOLDER};
use crate::errors::CryptoError;
use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Cheap profile for tests and constrained devices (8 MiB, 1 pass, 1 lane).
    pub fn low_memory() -> Self {
        Self {
            memory_kib: 8 * 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Build an Argon2id instance with these parameters and a 32-byte output.
    pub fn argon2(&self) -> Result<Argon2<'static>, CryptoError> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl fmt::Display for KdfParams {
    /// Stored form, e.g. `m=65536,t=3,p=4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={},t={},p={}",
            self.memory_kib, self.iterations, self.parallelism
        )
    }
}

impl FromStr for KdfParams {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut memory_kib = None;
        let mut iterations = None;
        let mut parallelism = None;

        for part in s.split(',') {
            let (name, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| CryptoError::KeyDerivation(format!("malformed KDF params '{}'", s)))?;
            let value: u32 = value
                .parse()
                .map_err(|_| CryptoError::KeyDerivation(format!("malformed KDF params '{}'", s)))?;
            match name {
                "m" => memory_kib = Some(value),
                "t" => iterations = Some(value),
                "p" => parallelism = Some(value),
                other => {
                    return Err(CryptoError::KeyDerivation(format!(
                        "unknown KDF parameter '{}'",
                        other
                    )))
                }
            }
        }

        match (memory_kib, iterations, parallelism) {
            (Some(memory_kib), Some(iterations), Some(parallelism)) => Ok(Self {
                memory_kib,
                iterations,
                parallelism,
            }),
            _ => Err(CryptoError::KeyDerivation(format!(
                "incomplete KDF params '{}'",
                s
            ))),
        }
    }
}

/// A 32-byte symmetric key that is wiped from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptionKey")
            .field(&REDACTED_PLACEHOLDER)
            .finish()
    }
}

/// Derive a 32-byte key from a password and salt with Argon2id.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the parameters are out of range or
/// the salt is too short for Argon2.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<EncryptionKey, CryptoError> {
    let argon2 = params.argon2()?;
    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let derived = EncryptionKey(key);
    key.zeroize();
    Ok(derived)
}
