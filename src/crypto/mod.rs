//! Cryptographic primitives for diary encryption.
//!
//! This module provides the building blocks used by the encrypted diary store:
//! authenticated encryption, passphrase-based key derivation, and password
//! hashing for the authentication layer that sits above the store.
//!
//! # Module Structure
//!
//! - `cipher`: AES-256-GCM sealing/opening with a fresh random nonce per call
//! - `kdf`: Argon2id key derivation and the zeroizing key wrapper
//! - `password`: Argon2id PHC password hashing and verification
//!
//! # Example
//!
//! ```
//! use moodstack::crypto::{derive_key, generate_salt, open, seal, KdfParams};
//!
//! let salt = generate_salt();
//! let key = derive_key(b"correct horse battery staple", &salt, &KdfParams::low_memory())?;
//!
//! let sealed = seal(key.as_bytes(), b"Secret diary entry")?;
//! let plaintext = open(key.as_bytes(), &sealed.nonce, &sealed.ciphertext)?;
//! assert_eq!(plaintext, b"Secret diary entry");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cipher;
pub mod kdf;
pub mod password;

// Re-export commonly used types
pub use self::cipher::{generate_nonce, generate_salt, open, seal, Sealed};
pub use self::kdf::{derive_key, EncryptionKey, KdfParams};
pub use self::password::{hash_password, verify_password};
