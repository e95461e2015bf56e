//! Configuration management for moodstack.
//!
//! Settings come from environment variables with sensible defaults. Paths are
//! expanded with `shellexpand`, so `~` and `$VARS` work as in a shell.
//!
//! # Environment Variables
//!
//! - `MOODSTACK_DB`: SQLite database path (defaults to ~/.local/share/moodstack/moodstack.db)
//! - `MOODSTACK_LEXICON`: emotion lexicon file (optional; the search path and
//!   then the built-in lexicon are used when unset)
//! - `MOODSTACK_OLLAMA_URL`: inference service base URL
//! - `MOODSTACK_AI_MODEL`: inference model name
//! - `MOODSTACK_AI_TIMEOUT_SECS`: inference request timeout, 1..=600 seconds

use crate::constants::{
    DEFAULT_AI_MODEL, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_DB_PATH, DEFAULT_OLLAMA_URL,
    ENV_VAR_AI_MODEL, ENV_VAR_AI_TIMEOUT_SECS, ENV_VAR_DB_PATH, ENV_VAR_LEXICON_PATH,
    ENV_VAR_OLLAMA_URL, MAX_AI_TIMEOUT_SECS,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for moodstack.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use moodstack::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/tmp/moodstack.db"),
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Config {
    /// Location of the SQLite database.
    pub db_path: PathBuf,

    /// Explicit lexicon definition file, if any.
    pub lexicon_path: Option<PathBuf>,

    /// Base URL of the inference service.
    pub ollama_url: String,

    /// Model used for external emotion analysis.
    pub ai_model: String,

    /// Inference request timeout in seconds.
    pub ai_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &"[REDACTED_PATH]")
            .field(
                "lexicon_path",
                &self.lexicon_path.as_ref().map(|_| "[REDACTED_PATH]"),
            )
            .field("ollama_url", &self.ollama_url)
            .field("ai_model", &self.ai_model)
            .field("ai_timeout_secs", &self.ai_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    /// Defaults with the database path left unexpanded.
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            lexicon_path: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Reads a variable, treating unset and blank alike.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a path cannot be expanded or the timeout
    /// is not an integer.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use moodstack::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Using model {}", config.ai_model),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let db_raw = non_empty_var(ENV_VAR_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = expand_path(&db_raw)?;

        let lexicon_path = non_empty_var(ENV_VAR_LEXICON_PATH)
            .map(|raw| expand_path(&raw))
            .transpose()?;

        let ollama_url =
            non_empty_var(ENV_VAR_OLLAMA_URL).unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let ai_model =
            non_empty_var(ENV_VAR_AI_MODEL).unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());

        let ai_timeout_secs = match non_empty_var(ENV_VAR_AI_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_VAR_AI_TIMEOUT_SECS, raw
                ))
            })?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(Config {
            db_path,
            lexicon_path,
            ollama_url,
            ai_model,
            ai_timeout_secs,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the database path is empty, the
    /// inference URL is not http(s), the model name is empty, or the timeout
    /// falls outside 1..=600 seconds.
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !(self.ollama_url.starts_with("http://") || self.ollama_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Inference URL must start with http:// or https://, got '{}'",
                self.ollama_url
            )));
        }

        if self.ai_model.trim().is_empty() {
            return Err(AppError::Config("AI model name is empty".to_string()));
        }

        if !(1..=MAX_AI_TIMEOUT_SECS).contains(&self.ai_timeout_secs) {
            return Err(AppError::Config(format!(
                "AI timeout must be between 1 and {} seconds, got {}",
                MAX_AI_TIMEOUT_SECS, self.ai_timeout_secs
            )));
        }

        Ok(())
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}
