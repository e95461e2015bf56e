//! Emotion analysis persistence.
//!
//! One row per (diary, owner). Re-analysis replaces the stored profile in
//! place; no history is retained.

use super::{decode_string_list, encode_string_list, format_timestamp, parse_timestamp};
use crate::emotion::{EmotionAnalysis, EmotionScores};
use crate::errors::{AppResult, DatabaseError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

/// An analysis as stored for a diary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub diary_id: String,
    pub owner_id: i64,
    #[serde(flatten)]
    pub analysis: EmotionAnalysis,
    /// BLAKE3 hex digest of the analyzed content
    pub content_checksum: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "diary_id, owner_id, joy, sadness, anger, fear, love, surprise, disgust, \
     dominant_emotion, confidence, sentiment_score, sentiment_label, keywords, analysis_method, \
     content_checksum, created_at, updated_at";

fn text_conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredAnalysis> {
    let scores = EmotionScores {
        joy: row.get(2)?,
        sadness: row.get(3)?,
        anger: row.get(4)?,
        fear: row.get(5)?,
        love: row.get(6)?,
        surprise: row.get(7)?,
        disgust: row.get(8)?,
    };

    let analysis = EmotionAnalysis {
        scores,
        dominant_emotion: row
            .get::<_, String>(9)?
            .parse()
            .map_err(|e| text_conversion(9, e))?,
        confidence: row.get(10)?,
        sentiment_score: row.get(11)?,
        sentiment_label: row
            .get::<_, String>(12)?
            .parse()
            .map_err(|e| text_conversion(12, e))?,
        keywords: decode_string_list(13, row.get(13)?)?,
        analysis_method: row
            .get::<_, String>(14)?
            .parse()
            .map_err(|e| text_conversion(14, e))?,
    };

    Ok(StoredAnalysis {
        diary_id: row.get(0)?,
        owner_id: row.get(1)?,
        analysis,
        content_checksum: row.get(15)?,
        created_at: parse_timestamp(16, row.get(16)?)?,
        updated_at: parse_timestamp(17, row.get(17)?)?,
    })
}

/// Inserts or replaces the analysis of a diary.
///
/// On conflict every field is overwritten, timestamps included, so a
/// re-analysis counts as new within trend windows.
pub fn upsert_analysis(
    conn: &Connection,
    diary_id: &str,
    owner_id: i64,
    analysis: &EmotionAnalysis,
    content_checksum: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    debug!(
        "Upserting {} analysis for diary {} (owner {})",
        analysis.analysis_method.as_str(),
        diary_id,
        owner_id
    );

    let keywords = encode_string_list(&analysis.keywords)?;
    let timestamp = format_timestamp(&now);
    let s = &analysis.scores;

    conn.execute(
        r#"
        INSERT INTO emotion_analyses (
            diary_id, owner_id, joy, sadness, anger, fear, love, surprise, disgust,
            dominant_emotion, confidence, sentiment_score, sentiment_label, keywords,
            analysis_method, content_checksum, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
        ON CONFLICT(diary_id, owner_id) DO UPDATE SET
            joy = excluded.joy,
            sadness = excluded.sadness,
            anger = excluded.anger,
            fear = excluded.fear,
            love = excluded.love,
            surprise = excluded.surprise,
            disgust = excluded.disgust,
            dominant_emotion = excluded.dominant_emotion,
            confidence = excluded.confidence,
            sentiment_score = excluded.sentiment_score,
            sentiment_label = excluded.sentiment_label,
            keywords = excluded.keywords,
            analysis_method = excluded.analysis_method,
            content_checksum = excluded.content_checksum,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at
        "#,
        params![
            diary_id,
            owner_id,
            s.joy,
            s.sadness,
            s.anger,
            s.fear,
            s.love,
            s.surprise,
            s.disgust,
            analysis.dominant_emotion.as_str(),
            analysis.confidence,
            analysis.sentiment_score,
            analysis.sentiment_label.as_str(),
            keywords,
            analysis.analysis_method.as_str(),
            content_checksum,
            timestamp,
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Retrieves the analysis of a diary, if one exists.
pub fn get_analysis(
    conn: &Connection,
    diary_id: &str,
    owner_id: i64,
) -> AppResult<Option<StoredAnalysis>> {
    debug!("Getting analysis for diary {} (owner {})", diary_id, owner_id);

    let sql = format!(
        "SELECT {} FROM emotion_analyses WHERE diary_id = ?1 AND owner_id = ?2",
        SELECT_COLUMNS
    );
    conn.query_row(&sql, params![diary_id, owner_id], map_row)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Lists an owner's analyses oldest first, optionally from `since` onwards.
pub fn list_analyses(
    conn: &Connection,
    owner_id: i64,
    since: Option<DateTime<Utc>>,
) -> AppResult<Vec<StoredAnalysis>> {
    let lower_bound = since.map(|ts| format_timestamp(&ts));
    debug!(
        "Listing analyses for owner {} since {:?}",
        owner_id, lower_bound
    );

    let sql = format!(
        "SELECT {} FROM emotion_analyses \
         WHERE owner_id = ?1 AND (?2 IS NULL OR created_at >= ?2) \
         ORDER BY created_at ASC, id ASC",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let rows = stmt
        .query_map(params![owner_id, lower_bound], map_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(rows)
}

/// Deletes the analysis of a diary. Returns whether a row existed.
pub fn delete_analysis(conn: &Connection, diary_id: &str, owner_id: i64) -> AppResult<bool> {
    let affected = conn
        .execute(
            "DELETE FROM emotion_analyses WHERE diary_id = ?1 AND owner_id = ?2",
            params![diary_id, owner_id],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(affected > 0)
}
