//! Persistence for encrypted diaries and emotion analyses.
//!
//! This module provides SQLite storage through rusqlite, pooled with r2d2.
//! Diary content never reaches this layer in plaintext: the store hands it
//! ciphertext, nonce and mode metadata, and reads the same back.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `diaries`: Encrypted diary row CRUD
//! - `analyses`: Emotion analysis upsert and owner-scoped scans
//!
//! # Example
//!
//! ```no_run
//! use moodstack::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/moodstack.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analyses;
pub mod diaries;
pub mod schema;

use crate::errors::{AppResult, DatabaseError};
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates a SQLite database file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The file is not a SQLite database
    /// - The connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(5) // Allow up to 5 concurrent connections
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Fail early on a file that is not a database
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Per-connection pragmas applied when the pool hands out a connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        // Writers from another pooled connection wait instead of failing
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

/// Formats a timestamp for storage.
///
/// Fixed microsecond precision with a `Z` suffix keeps lexical and
/// chronological order identical.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp, reporting failures as a column conversion error.
pub(crate) fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Serializes a string list column. An empty list is stored as `[]`, never NULL.
pub(crate) fn encode_string_list(values: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(values).map_err(DatabaseError::Serialization)
}

/// Decodes a string list column written by [`encode_string_list`].
pub(crate) fn decode_string_list(idx: usize, value: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
