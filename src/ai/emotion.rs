//! Emotion profiles produced by an external model.
//!
//! Model output is untrusted: the JSON payload is located inside the free-form
//! answer, every number is clamped into range, and labels that do not parse
//! are recomputed from the numbers.

use super::ollama::OllamaClient;
use super::prompts::emotion_prompt;
use crate::emotion::{
    clamp_signed, clamp_unit, dedup_keywords, AnalysisMethod, DominantEmotion, EmotionAnalysis,
    EmotionScores, SentimentLabel,
};
use crate::errors::{AIError, AppResult};
use serde::Deserialize;
use tracing::{debug, warn};

/// Source of an externally computed emotion profile.
pub trait ExternalAnalyzer {
    /// Analyzes `text`. Any error makes the caller fall back to local scoring.
    fn analyze(&self, text: &str) -> AppResult<EmotionAnalysis>;
}

/// External analyzer backed by an Ollama model.
#[derive(Debug, Clone)]
pub struct OllamaEmotionAnalyzer {
    client: OllamaClient,
    model: String,
}

impl OllamaEmotionAnalyzer {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl ExternalAnalyzer for OllamaEmotionAnalyzer {
    fn analyze(&self, text: &str) -> AppResult<EmotionAnalysis> {
        let answer = self.client.generate(&self.model, &emotion_prompt(text))?;
        parse_emotion_response(&answer)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EmotionPayload {
    joy: f64,
    sadness: f64,
    anger: f64,
    fear: f64,
    love: f64,
    surprise: f64,
    disgust: f64,
    dominant_emotion: String,
    confidence: f64,
    sentiment_score: f64,
    sentiment_label: String,
    keywords: Vec<String>,
}

/// Locates the outermost `{ ... }` span in a model answer.
fn extract_payload(answer: &str) -> Result<&str, AIError> {
    match (answer.find('{'), answer.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&answer[start..=end]),
        _ => Err(AIError::MissingPayload(format!(
            "{} chars without a JSON object",
            answer.chars().count()
        ))),
    }
}

/// Turns a model answer into a validated analysis tagged `ai`.
///
/// # Errors
///
/// Returns `AIError::MissingPayload` when no JSON object is present and
/// `AIError::InvalidResponse` when it does not parse.
pub fn parse_emotion_response(answer: &str) -> AppResult<EmotionAnalysis> {
    let json = extract_payload(answer)?;
    let payload: EmotionPayload = serde_json::from_str(json)
        .map_err(|e| AIError::InvalidResponse(format!("malformed emotion payload: {}", e)))?;

    let scores = EmotionScores {
        joy: payload.joy,
        sadness: payload.sadness,
        anger: payload.anger,
        fear: payload.fear,
        love: payload.love,
        surprise: payload.surprise,
        disgust: payload.disgust,
    }
    .clamped();
    let sentiment_score = clamp_signed(payload.sentiment_score);
    let mut confidence = clamp_unit(payload.confidence);

    let dominant_emotion = match payload.dominant_emotion.parse::<DominantEmotion>() {
        Ok(dominant) => dominant,
        Err(_) => {
            warn!(
                "Model returned unusable dominant emotion '{}', recomputing",
                payload.dominant_emotion
            );
            let (dominant, floor) = scores.dominant();
            if dominant == DominantEmotion::Neutral {
                confidence = confidence.max(floor);
            }
            dominant
        }
    };

    let sentiment_label = payload
        .sentiment_label
        .parse::<SentimentLabel>()
        .unwrap_or_else(|_| SentimentLabel::from_score(sentiment_score));

    let keywords = dedup_keywords(
        payload
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
    );

    debug!(
        "Parsed model profile: dominant {}, {} keywords",
        dominant_emotion,
        keywords.len()
    );

    Ok(EmotionAnalysis {
        scores,
        dominant_emotion,
        confidence,
        sentiment_score,
        sentiment_label,
        keywords,
        analysis_method: AnalysisMethod::Ai,
    })
}
