//! Encrypt-on-write, decrypt-on-read diary storage.
//!
//! The store never sees a master key outside a single call and never persists
//! one. Individually encrypted diaries carry their own salt and KDF
//! parameters; their plaintext is only reachable through
//! [`DiaryStore::get_with_password`].

use super::{
    DiaryContent, DiaryEntry, DiaryRecord, EncryptionInfo, EncryptionMode, EncryptionOptions,
    Unlock,
};
use crate::constants::KEY_SIZE;
use crate::crypto::{derive_key, generate_salt, open, seal, KdfParams};
use crate::db::diaries::{self, DiaryRow};
use crate::db::Database;
use crate::errors::{AppError, AppResult, CryptoError, DatabaseError};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Multi-mode encrypted diary store.
#[derive(Clone)]
pub struct DiaryStore {
    db: Database,
    kdf_params: KdfParams,
}

impl DiaryStore {
    /// Creates a store using the default Argon2 parameters for new
    /// individually encrypted diaries.
    pub fn new(db: Database) -> Self {
        Self::with_kdf_params(db, KdfParams::default())
    }

    pub fn with_kdf_params(db: Database, kdf_params: KdfParams) -> Self {
        Self { db, kdf_params }
    }

    /// Saves a diary in unified mode.
    pub fn save(&self, record: &DiaryRecord, owner_id: i64, master_key: &[u8]) -> AppResult<()> {
        self.save_with_options(record, owner_id, master_key, &EncryptionOptions::unified())
    }

    /// Encrypts a diary under the requested mode and upserts it by id.
    ///
    /// `master_key` is ignored in individual mode.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidArgument` for an empty id, inverted timestamps or a
    ///   missing individual password, before any cryptographic work
    /// - `AppError::Crypto` if key derivation or sealing fails
    /// - `AppError::Database` if the write fails
    pub fn save_with_options(
        &self,
        record: &DiaryRecord,
        owner_id: i64,
        master_key: &[u8],
        options: &EncryptionOptions,
    ) -> AppResult<()> {
        record.validate()?;
        let row = self.encrypt_record(record, owner_id, master_key, options)?;

        let conn = self.db.get_conn()?;
        diaries::upsert_diary(&conn, &row)?;

        info!(
            "Saved diary {} for owner {} (mode {})",
            record.id, owner_id, options.mode
        );
        Ok(())
    }

    fn encrypt_record(
        &self,
        record: &DiaryRecord,
        owner_id: i64,
        master_key: &[u8],
        options: &EncryptionOptions,
    ) -> AppResult<DiaryRow> {
        let content = record.content.as_bytes();

        let (sealed, encryption_salt, kdf_params) = match options.mode {
            EncryptionMode::Individual => {
                let password = options.require_password()?;
                let salt = generate_salt();
                let key = derive_key(password.as_bytes(), &salt, &self.kdf_params)?;
                let sealed = seal(key.as_bytes(), content)?;
                (sealed, Some(salt.to_vec()), Some(self.kdf_params.to_string()))
            }
            EncryptionMode::Unified | EncryptionMode::Biometric => {
                (seal(master_key, content)?, None, None)
            }
        };

        Ok(DiaryRow {
            id: record.id.clone(),
            owner_id,
            title: record.title.clone(),
            encrypted_content: sealed.ciphertext,
            nonce: sealed.nonce.to_vec(),
            file_name: record.file_name.clone(),
            file_type: record.file_type.clone(),
            tags: record.tags.clone(),
            encryption_mode: options.mode,
            encryption_salt,
            kdf_params,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn load_row(&self, id: &str, owner_id: i64) -> AppResult<DiaryRow> {
        let conn = self.db.get_conn()?;
        diaries::get_diary(&conn, id, owner_id)?
            .ok_or_else(|| AppError::NotFound(format!("diary '{}' for owner {}", id, owner_id)))
    }

    /// Lists an owner's diaries, newest first.
    ///
    /// Individually encrypted diaries come back locked. A diary that fails to
    /// decrypt under `master_key` is left out of the result.
    ///
    /// # Errors
    ///
    /// Fails as a whole only if the master key has the wrong length or the
    /// database cannot be read.
    pub fn list_decrypted(&self, owner_id: i64, master_key: &[u8]) -> AppResult<Vec<DiaryEntry>> {
        check_key_length(master_key)?;

        let rows = {
            let conn = self.db.get_conn()?;
            diaries::list_diaries(&conn, owner_id)?
        };
        let total = rows.len();

        let mut entries = Vec::with_capacity(total);
        for row in rows {
            let content = if row.encryption_mode.uses_master_key() {
                match decrypt_row(&row, master_key, "list_decrypted") {
                    Ok(plaintext) => DiaryContent::Plaintext(plaintext),
                    Err(e) => {
                        warn!("Skipping diary {} in listing: {}", row.id, e);
                        continue;
                    }
                }
            } else {
                DiaryContent::Locked
            };
            entries.push(entry_from_row(row, content));
        }

        debug!(
            "Listed {} of {} diaries for owner {}",
            entries.len(),
            total,
            owner_id
        );
        Ok(entries)
    }

    /// Retrieves one diary.
    ///
    /// Individually encrypted diaries come back locked rather than failing.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if the diary does not exist for this owner
    /// - `AppError::Decryption` if `master_key` does not open it
    pub fn get_decrypted(&self, id: &str, owner_id: i64, master_key: &[u8]) -> AppResult<DiaryEntry> {
        let row = self.load_row(id, owner_id)?;

        let content = if row.encryption_mode.uses_master_key() {
            DiaryContent::Plaintext(decrypt_row(&row, master_key, "get_decrypted")?)
        } else {
            DiaryContent::Locked
        };

        Ok(entry_from_row(row, content))
    }

    /// Retrieves an individually encrypted diary with its password.
    ///
    /// There is no separate password check: a wrong password fails the
    /// authenticated decryption.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidArgument` for an empty password or a diary that is
    ///   not individually encrypted
    /// - `AppError::NotFound` if the diary does not exist for this owner
    /// - `AppError::Decryption` for a wrong password
    pub fn get_with_password(&self, id: &str, owner_id: i64, password: &str) -> AppResult<DiaryEntry> {
        if password.is_empty() {
            return Err(AppError::InvalidArgument(
                "individual password must not be empty".to_string(),
            ));
        }

        let row = self.load_row(id, owner_id)?;
        let plaintext = self.decrypt_with_password(&row, password, "get_with_password")?;
        Ok(entry_from_row(row, DiaryContent::Plaintext(plaintext)))
    }

    fn decrypt_with_password(
        &self,
        row: &DiaryRow,
        password: &str,
        operation: &'static str,
    ) -> AppResult<String> {
        if row.encryption_mode != EncryptionMode::Individual {
            return Err(AppError::InvalidArgument(format!(
                "diary '{}' is not individually encrypted (mode {})",
                row.id, row.encryption_mode
            )));
        }

        let corrupt = |what: &str| {
            DatabaseError::Custom(format!("diary '{}' has no stored {}", row.id, what))
        };
        let salt = row.encryption_salt.as_deref().ok_or_else(|| corrupt("salt"))?;
        let params: KdfParams = row
            .kdf_params
            .as_deref()
            .ok_or_else(|| corrupt("KDF parameters"))?
            .parse()?;

        let key = derive_key(password.as_bytes(), salt, &params)?;
        decrypt_row(row, key.as_bytes(), operation)
    }

    /// Deletes a diary.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the diary does not exist for this owner.
    pub fn delete(&self, id: &str, owner_id: i64) -> AppResult<()> {
        let conn = self.db.get_conn()?;
        diaries::delete_diary(&conn, id, owner_id)?;
        info!("Deleted diary {} for owner {}", id, owner_id);
        Ok(())
    }

    /// Mode and salt presence of a diary, without decrypting it.
    pub fn encryption_info(&self, id: &str, owner_id: i64) -> AppResult<EncryptionInfo> {
        let row = self.load_row(id, owner_id)?;
        Ok(EncryptionInfo {
            mode: row.encryption_mode,
            has_salt: row.encryption_salt.as_ref().is_some_and(|s| !s.is_empty()),
        })
    }

    /// Rewrites a diary under new encryption options.
    ///
    /// The diary is first unlocked with its current credential: the master
    /// key for unified and biometric diaries, the password for individual
    /// ones. `master_key` is the key for the new mode and is ignored when the
    /// target is individual.
    pub fn re_encrypt(
        &self,
        id: &str,
        owner_id: i64,
        current: Unlock<'_>,
        master_key: &[u8],
        options: &EncryptionOptions,
    ) -> AppResult<()> {
        let row = self.load_row(id, owner_id)?;

        let plaintext = match current {
            Unlock::MasterKey(key) => {
                if !row.encryption_mode.uses_master_key() {
                    return Err(AppError::InvalidArgument(format!(
                        "diary '{}' is individually encrypted; unlock it with its password",
                        id
                    )));
                }
                decrypt_row(&row, key, "re_encrypt")?
            }
            Unlock::Password(password) => self.decrypt_with_password(&row, password, "re_encrypt")?,
        };

        let from = row.encryption_mode;
        let record = DiaryRecord {
            id: row.id,
            title: row.title,
            content: plaintext,
            tags: row.tags,
            file_name: row.file_name,
            file_type: row.file_type,
            created_at: row.created_at,
            updated_at: Utc::now().max(row.created_at),
        };
        self.save_with_options(&record, owner_id, master_key, options)?;

        info!(
            "Re-encrypted diary {} for owner {}: {} -> {}",
            id, owner_id, from, options.mode
        );
        Ok(())
    }
}

fn check_key_length(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Opens a row's ciphertext, attaching diary context to integrity failures.
fn decrypt_row(row: &DiaryRow, key: &[u8], operation: &'static str) -> AppResult<String> {
    let plaintext = open(key, &row.nonce, &row.encrypted_content).map_err(|e| match e {
        CryptoError::Authentication => AppError::Decryption {
            operation,
            diary_id: row.id.clone(),
            owner_id: row.owner_id,
        },
        other => AppError::Crypto(other),
    })?;

    String::from_utf8(plaintext).map_err(|_| {
        DatabaseError::Custom(format!("diary '{}' decrypted to invalid UTF-8", row.id)).into()
    })
}

fn entry_from_row(row: DiaryRow, content: DiaryContent) -> DiaryEntry {
    DiaryEntry {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        content,
        tags: row.tags,
        file_name: row.file_name,
        file_type: row.file_type,
        encryption_mode: row.encryption_mode,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
