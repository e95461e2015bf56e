//! Analysis strategies and the persistence-aware emotion service.
//!
//! An [`AnalysisMode`] expands to an ordered list of [`Strategy`] values. They
//! are tried in turn and the first success wins, so an unreachable or
//! confused external model never surfaces as a failure: it only demotes the
//! result to local scoring.

use super::blend::blend;
use super::engine;
use super::lexicon::EmotionLexicon;
use super::stats::EmotionStatistics;
use super::EmotionAnalysis;
use crate::ai::ExternalAnalyzer;
use crate::db::analyses::{self, StoredAnalysis};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use chrono::{Duration, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Lexical engine only
    #[default]
    Local,
    /// Lexical engine blended with the external model
    Blended,
    /// External model on its own
    AiOnly,
}

/// One way of producing an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    LexicalWithAiBlend,
    Ai,
    Lexical,
    Keyword,
}

impl AnalysisMode {
    /// Strategies in the order they are tried.
    pub fn strategies(&self) -> &'static [Strategy] {
        match self {
            AnalysisMode::Local => &[Strategy::Lexical, Strategy::Keyword],
            AnalysisMode::Blended => &[
                Strategy::LexicalWithAiBlend,
                Strategy::Lexical,
                Strategy::Keyword,
            ],
            AnalysisMode::AiOnly => &[Strategy::Ai, Strategy::Lexical, Strategy::Keyword],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Local => "local",
            AnalysisMode::Blended => "blended",
            AnalysisMode::AiOnly => "ai",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(AnalysisMode::Local),
            "blended" => Ok(AnalysisMode::Blended),
            "ai" => Ok(AnalysisMode::AiOnly),
            other => Err(AppError::InvalidArgument(format!(
                "unknown analysis mode '{}' (expected local, blended or ai)",
                other
            ))),
        }
    }
}

/// Runs strategy chains against a lexicon and an optional external model.
pub struct EmotionAnalyzer<'l> {
    lexicon: &'l EmotionLexicon,
    external: Option<Box<dyn ExternalAnalyzer + 'l>>,
}

impl<'l> EmotionAnalyzer<'l> {
    pub fn new(lexicon: &'l EmotionLexicon) -> Self {
        Self {
            lexicon,
            external: None,
        }
    }

    pub fn with_external(mut self, external: impl ExternalAnalyzer + 'l) -> Self {
        self.external = Some(Box::new(external));
        self
    }

    fn external(&self) -> AppResult<&(dyn ExternalAnalyzer + 'l)> {
        self.external
            .as_deref()
            .ok_or_else(|| AppError::Config("no external analyzer configured".to_string()))
    }

    /// Runs a single strategy.
    pub fn run_strategy(&self, strategy: Strategy, text: &str) -> AppResult<EmotionAnalysis> {
        match strategy {
            Strategy::Lexical => Ok(engine::analyze(text, self.lexicon)),
            Strategy::Keyword => Ok(engine::analyze_keywords(text, self.lexicon)),
            Strategy::Ai => self.external()?.analyze(text),
            Strategy::LexicalWithAiBlend => {
                let external = self.external()?.analyze(text)?;
                let local = engine::analyze(text, self.lexicon);
                Ok(blend(&local, &external))
            }
        }
    }

    /// Analyzes text, falling through the mode's strategies until one works.
    ///
    /// # Errors
    ///
    /// Only if every strategy failed, which the keyword fallback prevents in
    /// practice.
    pub fn analyze(&self, text: &str, mode: AnalysisMode) -> AppResult<EmotionAnalysis> {
        let mut last_error = None;
        for &strategy in mode.strategies() {
            match self.run_strategy(strategy, text) {
                Ok(analysis) => {
                    debug!(
                        "Strategy {:?} produced {} analysis",
                        strategy,
                        analysis.analysis_method.as_str()
                    );
                    return Ok(analysis);
                }
                Err(e) => {
                    warn!("Strategy {:?} failed, falling back: {}", strategy, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::InvalidArgument(format!("analysis mode {} has no strategies", mode))
        }))
    }
}

/// BLAKE3 hex digest used to detect changed diary content.
pub fn content_checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Analyzes diaries and keeps one stored analysis per diary.
pub struct EmotionService<'l> {
    db: Database,
    analyzer: EmotionAnalyzer<'l>,
}

impl<'l> EmotionService<'l> {
    pub fn new(db: Database, analyzer: EmotionAnalyzer<'l>) -> Self {
        Self { db, analyzer }
    }

    pub fn analyzer(&self) -> &EmotionAnalyzer<'l> {
        &self.analyzer
    }

    /// Analyzes text without persisting anything.
    pub fn analyze_text(&self, text: &str, mode: AnalysisMode) -> AppResult<EmotionAnalysis> {
        self.analyzer.analyze(text, mode)
    }

    /// Analyzes a diary's plaintext and replaces its stored analysis.
    pub fn analyze_diary(
        &self,
        diary_id: &str,
        owner_id: i64,
        content: &str,
        mode: AnalysisMode,
    ) -> AppResult<EmotionAnalysis> {
        let analysis = self.analyzer.analyze(content, mode)?;
        let checksum = content_checksum(content);

        let conn = self.db.get_conn()?;
        analyses::upsert_analysis(&conn, diary_id, owner_id, &analysis, &checksum, Utc::now())?;

        info!(
            "Analyzed diary {} for owner {}: {} ({})",
            diary_id,
            owner_id,
            analysis.dominant_emotion,
            analysis.analysis_method.as_str()
        );
        Ok(analysis)
    }

    /// Returns the stored analysis, re-analyzing only if the content changed.
    pub fn ensure_analysis(
        &self,
        diary_id: &str,
        owner_id: i64,
        content: &str,
        mode: AnalysisMode,
    ) -> AppResult<StoredAnalysis> {
        let checksum = content_checksum(content);
        if let Some(existing) = self.get_analysis(diary_id, owner_id)? {
            if existing.content_checksum == checksum {
                debug!("Diary {} unchanged since last analysis", diary_id);
                return Ok(existing);
            }
        }

        self.analyze_diary(diary_id, owner_id, content, mode)?;
        self.get_analysis(diary_id, owner_id)?.ok_or_else(|| {
            AppError::NotFound(format!(
                "analysis of diary '{}' for owner {}",
                diary_id, owner_id
            ))
        })
    }

    /// Stored analysis of a diary, if any.
    pub fn get_analysis(&self, diary_id: &str, owner_id: i64) -> AppResult<Option<StoredAnalysis>> {
        let conn = self.db.get_conn()?;
        analyses::get_analysis(&conn, diary_id, owner_id)
    }

    /// Removes a diary's analysis, e.g. after the diary was deleted.
    pub fn delete_analysis(&self, diary_id: &str, owner_id: i64) -> AppResult<bool> {
        let conn = self.db.get_conn()?;
        analyses::delete_analysis(&conn, diary_id, owner_id)
    }

    /// Analyses of an owner, oldest first, over the last `days` days
    /// (0 means all time).
    pub fn emotion_trends(&self, owner_id: i64, days: u32) -> AppResult<Vec<StoredAnalysis>> {
        let since = (days > 0).then(|| Utc::now() - Duration::days(i64::from(days)));
        let conn = self.db.get_conn()?;
        let trends = analyses::list_analyses(&conn, owner_id, since)?;
        debug!(
            "Loaded {} analyses for owner {} (days {})",
            trends.len(),
            owner_id,
            days
        );
        Ok(trends)
    }

    /// Aggregate statistics over the same window as [`Self::emotion_trends`].
    pub fn statistics(&self, owner_id: i64, days: u32) -> AppResult<EmotionStatistics> {
        let trends = self.emotion_trends(owner_id, days)?;
        Ok(EmotionStatistics::aggregate(trends.iter().map(|t| &t.analysis)))
    }
}
