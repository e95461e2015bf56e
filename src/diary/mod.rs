//! Encrypted diary records.
//!
//! Each diary is encrypted under one of three modes chosen at write time:
//!
//! - `unified`: the caller's master key
//! - `individual`: a key derived from a per-diary password and a random salt
//! - `biometric`: the master key, tagged as obtained through biometric unlock
//!
//! The mode, salt and KDF parameters are stored beside the ciphertext. Changing
//! a diary's mode is a full rewrite through [`DiaryStore::re_encrypt`].

pub mod search;
pub mod store;

pub use self::search::{MatchType, SearchResult};
pub use self::store::DiaryStore;

use crate::constants::{LOCKED_CONTENT_PLACEHOLDER, REDACTED_PLACEHOLDER};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key-derivation strategy for a stored diary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncryptionMode {
    #[default]
    Unified,
    Individual,
    Biometric,
}

impl EncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionMode::Unified => "unified",
            EncryptionMode::Individual => "individual",
            EncryptionMode::Biometric => "biometric",
        }
    }

    /// Whether the content key is the caller's master key.
    pub fn uses_master_key(&self) -> bool {
        !matches!(self, EncryptionMode::Individual)
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unified" => Ok(EncryptionMode::Unified),
            "individual" => Ok(EncryptionMode::Individual),
            "biometric" => Ok(EncryptionMode::Biometric),
            other => Err(AppError::InvalidArgument(format!(
                "unsupported encryption mode '{}'",
                other
            ))),
        }
    }
}

/// How a diary should be encrypted on save.
///
/// The individual password is wiped from memory when the options are dropped.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionOptions {
    #[zeroize(skip)]
    pub mode: EncryptionMode,
    pub individual_password: Option<String>,
}

impl EncryptionOptions {
    pub fn unified() -> Self {
        Self {
            mode: EncryptionMode::Unified,
            individual_password: None,
        }
    }

    pub fn biometric() -> Self {
        Self {
            mode: EncryptionMode::Biometric,
            individual_password: None,
        }
    }

    pub fn individual(password: impl Into<String>) -> Self {
        Self {
            mode: EncryptionMode::Individual,
            individual_password: Some(password.into()),
        }
    }

    /// Builds options from an untyped mode string, as received from a caller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` for an unknown mode, or for
    /// individual mode without a non-empty password.
    pub fn parse(mode: &str, individual_password: Option<&str>) -> AppResult<Self> {
        let options = Self {
            mode: mode.parse()?,
            individual_password: individual_password.map(str::to_string),
        };
        if options.mode == EncryptionMode::Individual {
            options.require_password()?;
        }
        Ok(options)
    }

    /// Returns the individual password, failing if it is missing or empty.
    pub(crate) fn require_password(&self) -> AppResult<&str> {
        match self.individual_password.as_deref() {
            Some(password) if !password.is_empty() => Ok(password),
            _ => Err(AppError::InvalidArgument(
                "individual encryption mode requires a non-empty password".to_string(),
            )),
        }
    }
}

impl fmt::Debug for EncryptionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionOptions")
            .field("mode", &self.mode)
            .field(
                "individual_password",
                &self.individual_password.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .finish()
    }
}

/// A diary as authored: plaintext lives only in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct DiaryRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Original file name for imported entries
    pub file_name: Option<String>,
    /// Original file type for imported entries
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryRecord {
    /// Creates a record with a generated UUID v4 id, stamped now.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            file_name: None,
            file_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the record-level invariants before anything is encrypted.
    pub(crate) fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "diary id must not be empty".to_string(),
            ));
        }
        if self.updated_at < self.created_at {
            return Err(AppError::InvalidArgument(format!(
                "diary '{}' has updated_at before created_at",
                self.id
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for DiaryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiaryRecord")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content", &REDACTED_PLACEHOLDER)
            .field("tags", &self.tags)
            .field("file_name", &self.file_name)
            .field("file_type", &self.file_type)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Content of a diary read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiaryContent {
    Plaintext(String),
    /// Individually encrypted; needs its own password to read.
    Locked,
}

impl DiaryContent {
    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            DiaryContent::Plaintext(text) => Some(text),
            DiaryContent::Locked => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, DiaryContent::Locked)
    }

    /// Text used for display and search; locked content shows a placeholder.
    pub fn display_text(&self) -> &str {
        match self {
            DiaryContent::Plaintext(text) => text,
            DiaryContent::Locked => LOCKED_CONTENT_PLACEHOLDER,
        }
    }
}

impl fmt::Display for DiaryContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

/// A decrypted (or locked) diary returned by read operations.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryEntry {
    pub id: String,
    pub owner_id: i64,
    pub title: String,
    pub content: DiaryContent,
    pub tags: Vec<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub encryption_mode: EncryptionMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Encryption metadata of a stored diary, readable without any key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionInfo {
    pub mode: EncryptionMode,
    pub has_salt: bool,
}

/// Credential that unlocks an existing diary.
#[derive(Clone, Copy)]
pub enum Unlock<'a> {
    MasterKey(&'a [u8]),
    Password(&'a str),
}

impl fmt::Debug for Unlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unlock::MasterKey(_) => f.write_str("MasterKey([REDACTED])"),
            Unlock::Password(_) => f.write_str("Password([REDACTED])"),
        }
    }
}
