//! Emotion and sentiment analysis.
//!
//! Text is scored against a lexicon of seven emotion categories. The scoring
//! strategies (lexical engine, basic keyword scoring, external model, blend)
//! all produce an [`EmotionAnalysis`] and share the same rules for picking the
//! dominant emotion and the sentiment label.
//!
//! # Module Structure
//!
//! - `lexicon`: Keyword/intensity/modifier dictionary, loaded once per process
//! - `engine`: Tokenization and the weighted lexical scoring engine
//! - `blend`: Weighted merge of a local and an external profile
//! - `stats`: Aggregation of stored analyses over time
//! - `analyzer`: Strategy chain plus persistence of results

pub mod analyzer;
pub mod blend;
pub mod engine;
pub mod lexicon;
pub mod stats;

pub use self::analyzer::{AnalysisMode, EmotionAnalyzer, EmotionService};
pub use self::lexicon::EmotionLexicon;
pub use self::stats::EmotionStatistics;

use crate::constants::{DOMINANT_THRESHOLD, SENTIMENT_THRESHOLD};
use crate::errors::AppError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The seven scored emotion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Surprise,
    Disgust,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Joy,
        Category::Sadness,
        Category::Anger,
        Category::Fear,
        Category::Love,
        Category::Surprise,
        Category::Disgust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Joy => "joy",
            Category::Sadness => "sadness",
            Category::Anger => "anger",
            Category::Fear => "fear",
            Category::Love => "love",
            Category::Surprise => "surprise",
            Category::Disgust => "disgust",
        }
    }

    /// Whether the category counts toward positive sentiment.
    pub fn is_positive(&self) -> bool {
        matches!(self, Category::Joy | Category::Love | Category::Surprise)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown emotion category '{}'", s)))
    }
}

/// Winning category, or neutral when nothing scored high enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DominantEmotion {
    Category(Category),
    Neutral,
}

impl DominantEmotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DominantEmotion::Category(c) => c.as_str(),
            DominantEmotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for DominantEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DominantEmotion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("neutral") {
            return Ok(DominantEmotion::Neutral);
        }
        s.parse().map(DominantEmotion::Category)
    }
}

impl Serialize for DominantEmotion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Labels a sentiment score; exactly ±0.1 is still neutral.
    pub fn from_score(score: f64) -> Self {
        if score > SENTIMENT_THRESHOLD {
            SentimentLabel::Positive
        } else if score < -SENTIMENT_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown sentiment label '{}'",
                s
            ))),
        }
    }
}

/// Which strategy produced an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnalysisMethod {
    #[serde(rename = "programmatic")]
    Programmatic,
    #[serde(rename = "enhanced")]
    Enhanced,
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "enhanced+ai")]
    EnhancedAi,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Programmatic => "programmatic",
            AnalysisMethod::Enhanced => "enhanced",
            AnalysisMethod::Ai => "ai",
            AnalysisMethod::EnhancedAi => "enhanced+ai",
        }
    }
}

impl FromStr for AnalysisMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programmatic" => Ok(AnalysisMethod::Programmatic),
            "enhanced" => Ok(AnalysisMethod::Enhanced),
            "ai" => Ok(AnalysisMethod::Ai),
            "enhanced+ai" => Ok(AnalysisMethod::EnhancedAi),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown analysis method '{}'",
                s
            ))),
        }
    }
}

/// Per-category scores, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EmotionScores {
    pub joy: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub love: f64,
    pub surprise: f64,
    pub disgust: f64,
}

impl EmotionScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Joy => self.joy,
            Category::Sadness => self.sadness,
            Category::Anger => self.anger,
            Category::Fear => self.fear,
            Category::Love => self.love,
            Category::Surprise => self.surprise,
            Category::Disgust => self.disgust,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        let slot = match category {
            Category::Joy => &mut self.joy,
            Category::Sadness => &mut self.sadness,
            Category::Anger => &mut self.anger,
            Category::Fear => &mut self.fear,
            Category::Love => &mut self.love,
            Category::Surprise => &mut self.surprise,
            Category::Disgust => &mut self.disgust,
        };
        *slot = value;
    }

    /// Scores paired with their category, in `Category::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.get(c)))
    }

    /// Builds scores from a function of the category.
    pub fn from_fn(mut f: impl FnMut(Category) -> f64) -> Self {
        let mut scores = Self::default();
        for category in Category::ALL {
            scores.set(category, f(category));
        }
        scores
    }

    /// Copy with every score clamped into [0, 1]; NaN becomes 0.
    pub fn clamped(&self) -> Self {
        Self::from_fn(|c| clamp_unit(self.get(c)))
    }

    /// Strictly highest-scoring category, if any score is above zero.
    pub fn top(&self) -> Option<(Category, f64)> {
        let mut best: Option<(Category, f64)> = None;
        for (category, score) in self.iter() {
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((category, score));
            }
        }
        best
    }

    /// Dominant emotion and its confidence.
    ///
    /// Below the threshold the result is neutral with the floor confidence.
    pub fn dominant(&self) -> (DominantEmotion, f64) {
        match self.top() {
            Some((category, score)) if score >= DOMINANT_THRESHOLD => {
                (DominantEmotion::Category(category), score)
            }
            _ => (DominantEmotion::Neutral, DOMINANT_THRESHOLD),
        }
    }
}

/// Clamps into [0, 1], mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamps into [-1, 1], mapping NaN to 0.
pub fn clamp_signed(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// An emotion and sentiment profile of one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    #[serde(flatten)]
    pub scores: EmotionScores,
    pub dominant_emotion: DominantEmotion,
    pub confidence: f64,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// Unique keywords; order carries no meaning
    pub keywords: Vec<String>,
    pub analysis_method: AnalysisMethod,
}

impl EmotionAnalysis {
    /// Assembles an analysis, deriving dominant emotion, confidence and
    /// sentiment label from the numbers.
    pub fn from_scores(
        scores: EmotionScores,
        sentiment_score: f64,
        keywords: Vec<String>,
        method: AnalysisMethod,
    ) -> Self {
        let scores = scores.clamped();
        let sentiment_score = clamp_signed(sentiment_score);
        let (dominant_emotion, confidence) = scores.dominant();

        Self {
            scores,
            dominant_emotion,
            confidence,
            sentiment_score,
            sentiment_label: SentimentLabel::from_score(sentiment_score),
            keywords: dedup_keywords(keywords),
            analysis_method: method,
        }
    }
}

/// Removes duplicate keywords, keeping the first occurrence.
pub fn dedup_keywords<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_deadband() {
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.1001), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.5), SentimentLabel::Negative);
    }

    #[test]
    fn test_dominant_below_threshold_is_neutral() {
        let scores = EmotionScores {
            anger: 0.05,
            ..Default::default()
        };
        assert_eq!(scores.dominant(), (DominantEmotion::Neutral, 0.1));
        assert_eq!(
            EmotionScores::default().dominant(),
            (DominantEmotion::Neutral, 0.1)
        );
    }

    #[test]
    fn test_dominant_picks_highest() {
        let scores = EmotionScores {
            fear: 0.4,
            love: 0.7,
            ..Default::default()
        };
        assert_eq!(
            scores.dominant(),
            (DominantEmotion::Category(Category::Love), 0.7)
        );
    }

    #[test]
    fn test_clamping() {
        let scores = EmotionScores {
            joy: 1.7,
            sadness: -0.2,
            anger: f64::NAN,
            ..Default::default()
        }
        .clamped();
        assert_eq!(scores.joy, 1.0);
        assert_eq!(scores.sadness, 0.0);
        assert_eq!(scores.anger, 0.0);
        assert_eq!(clamp_signed(-3.0), -1.0);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("Joy".parse::<Category>().unwrap(), Category::Joy);
        assert_eq!(
            "neutral".parse::<DominantEmotion>().unwrap(),
            DominantEmotion::Neutral
        );
        assert!("happiness".parse::<DominantEmotion>().is_err());
        assert_eq!(
            "enhanced+ai".parse::<AnalysisMethod>().unwrap(),
            AnalysisMethod::EnhancedAi
        );
        assert!("NEGATIVE".parse::<SentimentLabel>().is_ok());
    }

    #[test]
    fn test_analysis_serializes_flat_camel_case() {
        let analysis = EmotionAnalysis::from_scores(
            EmotionScores {
                joy: 0.5,
                ..Default::default()
            },
            0.4,
            vec!["happy".to_string(), "happy".to_string()],
            AnalysisMethod::EnhancedAi,
        );
        let value = serde_json::to_value(&analysis).unwrap();

        assert_eq!(value["joy"], 0.5);
        assert_eq!(value["dominantEmotion"], "joy");
        assert_eq!(value["sentimentLabel"], "positive");
        assert_eq!(value["analysisMethod"], "enhanced+ai");
        assert_eq!(value["keywords"].as_array().unwrap().len(), 1);
    }
}
