//! Constants used throughout the library.
//!
//! This module contains all constants used in moodstack, organized into
//! logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "moodstack";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Encrypted diary storage with emotion analysis";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the SQLite database path.
pub const ENV_VAR_DB_PATH: &str = "MOODSTACK_DB";
/// Environment variable for an explicit lexicon definition file.
pub const ENV_VAR_LEXICON_PATH: &str = "MOODSTACK_LEXICON";
/// Environment variable for the inference service base URL.
pub const ENV_VAR_OLLAMA_URL: &str = "MOODSTACK_OLLAMA_URL";
/// Environment variable for the inference model name.
pub const ENV_VAR_AI_MODEL: &str = "MOODSTACK_AI_MODEL";
/// Environment variable for the inference request timeout in seconds.
pub const ENV_VAR_AI_TIMEOUT_SECS: &str = "MOODSTACK_AI_TIMEOUT_SECS";
/// Default database location (expanded with shellexpand).
pub const DEFAULT_DB_PATH: &str = "~/.local/share/moodstack/moodstack.db";

// Crypto Parameters
/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;
/// AES-GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;
/// Per-record salt length in bytes.
pub const SALT_SIZE: usize = 16;
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";
/// Presentation text for a diary that needs its individual password.
pub const LOCKED_CONTENT_PLACEHOLDER: &str = "[This diary requires its individual password]";

// Search
/// Characters of context kept on each side of a search hit.
pub const DEFAULT_SNIPPET_CONTEXT: usize = 100;
/// Maximum snippets extracted per diary.
pub const MAX_SNIPPETS_PER_DIARY: usize = 3;

// AI Configuration
/// Default inference service URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model for emotion analysis.
pub const DEFAULT_AI_MODEL: &str = "qwen2.5:7b";
/// Default inference request timeout in seconds.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
/// Upper bound accepted for the inference timeout.
pub const MAX_AI_TIMEOUT_SECS: u64 = 600;

// Emotion Scoring
/// Weight of a high-intensity keyword.
pub const WEIGHT_HIGH: f64 = 1.0;
/// Weight of a medium-intensity keyword (also the default tier).
pub const WEIGHT_MEDIUM: f64 = 0.6;
/// Weight of a low-intensity keyword.
pub const WEIGHT_LOW: f64 = 0.3;
/// Multiplier applied by a nearby negation term.
pub const NEGATION_MULTIPLIER: f64 = -1.0;
/// Multiplier applied by a nearby intensifier.
pub const INTENSIFIER_MULTIPLIER: f64 = 1.5;
/// Multiplier applied by a nearby diminisher.
pub const DIMINISHER_MULTIPLIER: f64 = 0.5;
/// Window (in tokens) searched for negation terms.
pub const NEGATION_WINDOW: usize = 3;
/// Window (in tokens) searched for intensifiers and diminishers.
pub const MODIFIER_WINDOW: usize = 2;
/// Scale applied to per-word density before clamping.
pub const SCORE_SCALE: f64 = 10.0;
/// Sentiment deadband; scores within it are neutral.
pub const SENTIMENT_THRESHOLD: f64 = 0.1;
/// Minimum winning score for a non-neutral dominant emotion, and the
/// confidence floor used when the result is neutral.
pub const DOMINANT_THRESHOLD: f64 = 0.1;
/// Weight of the locally computed profile in a blend.
pub const LOCAL_BLEND_WEIGHT: f64 = 0.4;
/// Weight of the external profile in a blend.
pub const EXTERNAL_BLEND_WEIGHT: f64 = 0.6;
/// Number of keywords reported by statistics.
pub const TOP_KEYWORDS_LIMIT: usize = 20;

// Lexicon
/// Lexicon files probed, in order, when no explicit path is configured.
pub const LEXICON_SEARCH_PATHS: &[&str] = &[
    "emotion_dictionaries/emotion_keywords.json",
    "./emotion_keywords.json",
    "../emotion_dictionaries/emotion_keywords.json",
];

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "moodstack";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
