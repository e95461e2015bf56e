/*!
# moodstack

moodstack stores diary entries encrypted at rest and scores them with a
weighted emotion lexicon, optionally blended with a profile from a local
inference service.

## Core Features

- Per-diary encryption modes: unified (master key), individual (per-diary
  password through Argon2id) and biometric (master key, tagged)
- Owner-scoped list, lookup, search and delete with graceful degradation for
  locked diaries
- Seven-category emotion scoring with negation, intensifier and diminisher
  handling, CJK segmentation, and a fallback chain of analysis strategies
- Stored analyses with change detection, trends and aggregate statistics

## Architecture

- `crypto`: AES-256-GCM sealing, Argon2id key derivation, password hashing
- `db`: SQLite pool, schema and row-level CRUD
- `diary`: the encrypted record store and search
- `emotion`: lexicon, scoring engine, blending, statistics, analysis service
- `ai`: inference client and external emotion analyzer
- `config`, `cli`, `errors`, `constants`: ambient plumbing

## Usage Example

```rust,no_run
use moodstack::crypto::KdfParams;
use moodstack::db::Database;
use moodstack::diary::{DiaryRecord, DiaryStore};
use moodstack::emotion::{AnalysisMode, EmotionAnalyzer, EmotionLexicon};
use std::path::Path;

fn main() -> moodstack::AppResult<()> {
    let db = Database::open(Path::new("/tmp/moodstack.db"))?;
    db.initialize_schema()?;

    let store = DiaryStore::with_kdf_params(db, KdfParams::default());
    let master_key = [7u8; 32];
    let record = DiaryRecord::new("Sunday", "我今天非常开心");
    store.save(&record, 1, &master_key)?;

    let lexicon = EmotionLexicon::builtin();
    let analysis = EmotionAnalyzer::new(&lexicon).analyze(&record.content, AnalysisMode::Local)?;
    println!("{}", analysis.dominant_emotion.as_str());
    Ok(())
}
```
*/

/// Inference client and external emotion analysis
pub mod ai;
/// Command-line argument definitions
pub mod cli;
/// Configuration loading and validation
pub mod config;
/// Named constants shared across the crate
pub mod constants;
/// Authenticated encryption and key derivation
pub mod crypto;
/// SQLite persistence
pub mod db;
/// Encrypted diary records and their store
pub mod diary;
/// Emotion lexicon, scoring and analysis service
pub mod emotion;
/// Error types and utilities for error handling
pub mod errors;

// Re-export important types for convenience
pub use config::Config;
pub use diary::{DiaryEntry, DiaryRecord, DiaryStore, EncryptionMode, EncryptionOptions};
pub use emotion::{AnalysisMode, EmotionAnalysis, EmotionAnalyzer, EmotionService};
pub use errors::{AppError, AppResult};
