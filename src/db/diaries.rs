//! Encrypted diary row operations.
//!
//! Rows hold ciphertext only. Every query is scoped by owner id.

use super::{decode_string_list, encode_string_list, format_timestamp, parse_timestamp};
use crate::diary::EncryptionMode;
use crate::errors::{AppError, AppResult, DatabaseError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

/// Persisted form of a diary.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryRow {
    pub id: String,
    pub owner_id: i64,
    pub title: String,
    pub encrypted_content: Vec<u8>,
    pub nonce: Vec<u8>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub tags: Vec<String>,
    pub encryption_mode: EncryptionMode,
    /// Present iff `encryption_mode` is individual
    pub encryption_salt: Option<Vec<u8>>,
    /// Argon2 parameters used with the salt
    pub kdf_params: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, owner_id, title, encrypted_content, nonce, file_name, file_type, \
     tags, encryption_mode, encryption_salt, kdf_params, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<DiaryRow> {
    let mode: String = row.get(8)?;
    let encryption_mode = mode.parse::<EncryptionMode>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(DiaryRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        encrypted_content: row.get(3)?,
        nonce: row.get(4)?,
        file_name: row.get(5)?,
        file_type: row.get(6)?,
        tags: decode_string_list(7, row.get(7)?)?,
        encryption_mode,
        encryption_salt: row.get(9)?,
        kdf_params: row.get(10)?,
        created_at: parse_timestamp(11, row.get(11)?)?,
        updated_at: parse_timestamp(12, row.get(12)?)?,
    })
}

/// Inserts a diary row or fully overwrites the row with the same id.
///
/// An id that already belongs to a different owner is refused rather than
/// taken over.
///
/// # Errors
///
/// Returns `AppError::InvalidArgument` if the id is held by another owner,
/// or a database error if the write violates a constraint.
pub fn upsert_diary(conn: &Connection, row: &DiaryRow) -> AppResult<()> {
    debug!(
        "Upserting diary {} for owner {} (mode {})",
        row.id, row.owner_id, row.encryption_mode
    );

    let tags = encode_string_list(&row.tags)?;

    let affected = conn
        .execute(
            r#"
            INSERT INTO encrypted_diaries (
                id, owner_id, title, encrypted_content, nonce, file_name, file_type,
                tags, encryption_mode, encryption_salt, kdf_params, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                encrypted_content = excluded.encrypted_content,
                nonce = excluded.nonce,
                file_name = excluded.file_name,
                file_type = excluded.file_type,
                tags = excluded.tags,
                encryption_mode = excluded.encryption_mode,
                encryption_salt = excluded.encryption_salt,
                kdf_params = excluded.kdf_params,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            WHERE encrypted_diaries.owner_id = excluded.owner_id
            "#,
            params![
                row.id,
                row.owner_id,
                row.title,
                row.encrypted_content,
                row.nonce,
                row.file_name,
                row.file_type,
                tags,
                row.encryption_mode.as_str(),
                row.encryption_salt,
                row.kdf_params,
                format_timestamp(&row.created_at),
                format_timestamp(&row.updated_at),
            ],
        )
        .map_err(DatabaseError::Sqlite)?;

    if affected == 0 {
        return Err(AppError::InvalidArgument(format!(
            "diary id '{}' is not available to owner {}",
            row.id, row.owner_id
        )));
    }

    Ok(())
}

/// Retrieves a diary row by id, scoped to its owner.
///
/// Returns `Ok(None)` if the row is missing or owned by someone else.
pub fn get_diary(conn: &Connection, id: &str, owner_id: i64) -> AppResult<Option<DiaryRow>> {
    debug!("Getting diary {} for owner {}", id, owner_id);

    let sql = format!(
        "SELECT {} FROM encrypted_diaries WHERE id = ?1 AND owner_id = ?2",
        SELECT_COLUMNS
    );
    conn.query_row(&sql, params![id, owner_id], map_row)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Lists all diary rows of an owner, newest first.
pub fn list_diaries(conn: &Connection, owner_id: i64) -> AppResult<Vec<DiaryRow>> {
    debug!("Listing diaries for owner {}", owner_id);

    let sql = format!(
        "SELECT {} FROM encrypted_diaries WHERE owner_id = ?1 ORDER BY created_at DESC, id",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let rows = stmt
        .query_map(params![owner_id], map_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    debug!("Found {} diaries for owner {}", rows.len(), owner_id);
    Ok(rows)
}

/// Deletes a diary row scoped to its owner.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no row with this id belongs to the owner.
pub fn delete_diary(conn: &Connection, id: &str, owner_id: i64) -> AppResult<()> {
    debug!("Deleting diary {} for owner {}", id, owner_id);

    let affected = conn
        .execute(
            "DELETE FROM encrypted_diaries WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )
        .map_err(DatabaseError::Sqlite)?;

    if affected == 0 {
        return Err(AppError::NotFound(format!(
            "diary '{}' for owner {}",
            id, owner_id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use chrono::{Duration, TimeZone};

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn unified_row(id: &str, owner_id: i64, day: u32) -> DiaryRow {
        let created = Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap();
        DiaryRow {
            id: id.to_string(),
            owner_id,
            title: format!("Day {}", day),
            encrypted_content: vec![1, 2, 3],
            nonce: vec![0; 12],
            file_name: None,
            file_type: None,
            tags: vec!["daily".to_string()],
            encryption_mode: EncryptionMode::Unified,
            encryption_salt: None,
            kdf_params: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_upsert_and_get_diary() {
        let conn = setup_test_db();
        let row = unified_row("d1", 1, 1);

        upsert_diary(&conn, &row).unwrap();

        let fetched = get_diary(&conn, "d1", 1).unwrap().unwrap();
        assert_eq!(fetched, row);
    }

    #[test]
    fn test_get_diary_scoped_by_owner() {
        let conn = setup_test_db();
        upsert_diary(&conn, &unified_row("d1", 1, 1)).unwrap();

        assert!(get_diary(&conn, "d1", 2).unwrap().is_none());
        assert!(get_diary(&conn, "missing", 1).unwrap().is_none());
    }

    #[test]
    fn test_upsert_overwrites_existing_row() {
        let conn = setup_test_db();
        let mut row = unified_row("d1", 1, 1);
        upsert_diary(&conn, &row).unwrap();

        row.title = "Rewritten".to_string();
        row.encrypted_content = vec![9, 9];
        row.tags = Vec::new();
        row.updated_at = row.created_at + Duration::hours(1);
        upsert_diary(&conn, &row).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM encrypted_diaries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let fetched = get_diary(&conn, "d1", 1).unwrap().unwrap();
        assert_eq!(fetched.title, "Rewritten");
        assert_eq!(fetched.encrypted_content, vec![9, 9]);
        assert!(fetched.tags.is_empty());

        let raw_tags: String = conn
            .query_row("SELECT tags FROM encrypted_diaries WHERE id = 'd1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(raw_tags, "[]");
    }

    #[test]
    fn test_upsert_refuses_other_owners_id() {
        let conn = setup_test_db();
        upsert_diary(&conn, &unified_row("d1", 1, 1)).unwrap();

        let result = upsert_diary(&conn, &unified_row("d1", 2, 1));
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));

        let fetched = get_diary(&conn, "d1", 1).unwrap().unwrap();
        assert_eq!(fetched.owner_id, 1);
    }

    #[test]
    fn test_upsert_rejects_salt_on_unified_row() {
        let conn = setup_test_db();
        let mut row = unified_row("d1", 1, 1);
        row.encryption_salt = Some(vec![1; 16]);
        row.kdf_params = Some("m=8192,t=1,p=1".to_string());

        assert!(upsert_diary(&conn, &row).is_err());
    }

    #[test]
    fn test_list_diaries_newest_first() {
        let conn = setup_test_db();
        upsert_diary(&conn, &unified_row("old", 1, 1)).unwrap();
        upsert_diary(&conn, &unified_row("new", 1, 20)).unwrap();
        upsert_diary(&conn, &unified_row("mid", 1, 10)).unwrap();
        upsert_diary(&conn, &unified_row("other", 2, 15)).unwrap();

        let ids: Vec<String> = list_diaries(&conn, 1)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_delete_diary() {
        let conn = setup_test_db();
        upsert_diary(&conn, &unified_row("d1", 1, 1)).unwrap();

        let result = delete_diary(&conn, "d1", 2);
        assert!(matches!(result, Err(AppError::NotFound(_))));

        delete_diary(&conn, "d1", 1).unwrap();
        assert!(get_diary(&conn, "d1", 1).unwrap().is_none());

        let result = delete_diary(&conn, "d1", 1);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
