//! Database schema definitions and initialization.
//!
//! The storage-level invariants (salt present iff individual mode, one
//! analysis per diary and owner, `updated_at >= created_at`) are enforced by
//! CHECK and UNIQUE constraints so no code path can persist a row that breaks
//! them.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
///
/// Increment this whenever schema changes are made to support future migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `encrypted_diaries`: Ciphertext, nonce and mode metadata per diary
/// - `emotion_analyses`: Latest analysis per (diary, owner)
/// - `schema_version`: Applied schema version
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    // Encrypted diaries: title stays readable for list views
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS encrypted_diaries (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id INTEGER NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            encrypted_content BLOB NOT NULL,
            nonce BLOB NOT NULL,
            file_name TEXT,
            file_type TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            encryption_mode TEXT NOT NULL
                CHECK (encryption_mode IN ('unified', 'individual', 'biometric')),
            encryption_salt BLOB,
            kdf_params TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK ((encryption_mode = 'individual') =
                   (encryption_salt IS NOT NULL AND length(encryption_salt) > 0
                    AND kdf_params IS NOT NULL)),
            CHECK (updated_at >= created_at)
        );

        CREATE INDEX IF NOT EXISTS idx_diaries_owner_created
            ON encrypted_diaries(owner_id, created_at DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // Emotion analyses: one row per (diary, owner), overwritten on re-analysis
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS emotion_analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            diary_id TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            joy REAL NOT NULL DEFAULT 0,
            sadness REAL NOT NULL DEFAULT 0,
            anger REAL NOT NULL DEFAULT 0,
            fear REAL NOT NULL DEFAULT 0,
            love REAL NOT NULL DEFAULT 0,
            surprise REAL NOT NULL DEFAULT 0,
            disgust REAL NOT NULL DEFAULT 0,
            dominant_emotion TEXT NOT NULL,
            confidence REAL NOT NULL,
            sentiment_score REAL NOT NULL,
            sentiment_label TEXT NOT NULL
                CHECK (sentiment_label IN ('positive', 'negative', 'neutral')),
            keywords TEXT NOT NULL DEFAULT '[]',
            analysis_method TEXT NOT NULL,
            content_checksum TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(diary_id, owner_id)
        );

        CREATE INDEX IF NOT EXISTS idx_analyses_owner_created
            ON emotion_analyses(owner_id, created_at);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // Schema version tracking
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .map_err(DatabaseError::Sqlite)?;

    info!("Database schema created (version {})", SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_diary(
        conn: &Connection,
        mode: &str,
        salt: Option<&[u8]>,
        kdf: Option<&str>,
    ) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO encrypted_diaries (id, owner_id, encrypted_content, nonce, encryption_mode, encryption_salt, kdf_params, created_at, updated_at)
             VALUES ('d1', 1, x'00', x'00', ?1, ?2, ?3, '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
            rusqlite::params![mode, salt, kdf],
        )
    }

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"encrypted_diaries".to_string()));
        assert!(tables.contains(&"emotion_analyses".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_version_recorded_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_salt_required_for_individual_mode() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        assert!(insert_diary(&conn, "individual", None, None).is_err());
        assert!(insert_diary(&conn, "individual", Some(&[][..]), Some("m=8192,t=1,p=1")).is_err());
        assert!(insert_diary(&conn, "individual", Some(&[1u8; 16][..]), Some("m=8192,t=1,p=1")).is_ok());
    }

    #[test]
    fn test_salt_forbidden_for_master_key_modes() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        assert!(insert_diary(&conn, "unified", Some(&[1u8; 16][..]), Some("m=8192,t=1,p=1")).is_err());
        assert!(insert_diary(&conn, "biometric", Some(&[1u8; 16][..]), None).is_err());
        assert!(insert_diary(&conn, "rot13", None, None).is_err());
        assert!(insert_diary(&conn, "biometric", None, None).is_ok());
    }

    #[test]
    fn test_updated_at_not_before_created_at() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO encrypted_diaries (id, owner_id, encrypted_content, nonce, encryption_mode, created_at, updated_at)
             VALUES ('d1', 1, x'00', x'00', 'unified', '2024-01-02T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
            [],
        );
        assert!(result.is_err());
    }
}
