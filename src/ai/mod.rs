//! External model integration for emotion analysis.
//!
//! This module talks to a local Ollama server. The model is asked for a JSON
//! emotion profile; the answer is free-form text that is expected to embed
//! that JSON somewhere.
//!
//! # Module Structure
//!
//! - `ollama`: HTTP client for the Ollama generate API
//! - `prompts`: Prompt construction
//! - `emotion`: Payload extraction, validation and the analyzer seam
//!
//! # Example
//!
//! ```no_run
//! use moodstack::ai::{ExternalAnalyzer, OllamaClient, OllamaEmotionAnalyzer};
//! use std::time::Duration;
//!
//! let client = OllamaClient::new("http://127.0.0.1:11434", Duration::from_secs(60))?;
//! let analyzer = OllamaEmotionAnalyzer::new(client, "qwen2.5:7b");
//! let analysis = analyzer.analyze("今天很开心")?;
//! println!("{}", analysis.dominant_emotion);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod emotion;
pub mod ollama;
pub mod prompts;

// Re-export commonly used types
pub use emotion::{parse_emotion_response, ExternalAnalyzer, OllamaEmotionAnalyzer};
pub use ollama::OllamaClient;
pub use prompts::emotion_prompt;
