//! Aggregation of stored analyses.

use super::{Category, DominantEmotion, EmotionAnalysis, EmotionScores, SentimentLabel};
use crate::constants::TOP_KEYWORDS_LIMIT;
use serde::Serialize;
use std::collections::HashMap;

/// Number of analyses per sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

/// Number of analyses per dominant emotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmotionDistribution {
    pub joy: usize,
    pub sadness: usize,
    pub anger: usize,
    pub fear: usize,
    pub love: usize,
    pub surprise: usize,
    pub disgust: usize,
    pub neutral: usize,
}

impl EmotionDistribution {
    fn slot(&mut self, dominant: DominantEmotion) -> &mut usize {
        match dominant {
            DominantEmotion::Category(Category::Joy) => &mut self.joy,
            DominantEmotion::Category(Category::Sadness) => &mut self.sadness,
            DominantEmotion::Category(Category::Anger) => &mut self.anger,
            DominantEmotion::Category(Category::Fear) => &mut self.fear,
            DominantEmotion::Category(Category::Love) => &mut self.love,
            DominantEmotion::Category(Category::Surprise) => &mut self.surprise,
            DominantEmotion::Category(Category::Disgust) => &mut self.disgust,
            DominantEmotion::Neutral => &mut self.neutral,
        }
    }

    pub fn get(&self, dominant: DominantEmotion) -> usize {
        match dominant {
            DominantEmotion::Category(category) => match category {
                Category::Joy => self.joy,
                Category::Sadness => self.sadness,
                Category::Anger => self.anger,
                Category::Fear => self.fear,
                Category::Love => self.love,
                Category::Surprise => self.surprise,
                Category::Disgust => self.disgust,
            },
            DominantEmotion::Neutral => self.neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordFrequency {
    pub keyword: String,
    pub count: usize,
}

/// Summary of an owner's analyses over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionStatistics {
    pub total_entries: usize,
    pub average_emotions: EmotionScores,
    pub sentiment_distribution: SentimentCounts,
    pub emotion_distribution: EmotionDistribution,
    /// Most frequent keywords, highest count first. Equal counts are ordered
    /// by keyword, which callers should not rely on.
    pub top_keywords: Vec<KeywordFrequency>,
}

impl EmotionStatistics {
    /// Aggregates analyses. An empty input yields the all-zero summary.
    pub fn aggregate<'a, I>(analyses: I) -> Self
    where
        I: IntoIterator<Item = &'a EmotionAnalysis>,
    {
        let mut stats = Self::default();
        let mut sums = EmotionScores::default();
        let mut keyword_counts: HashMap<&str, usize> = HashMap::new();

        for analysis in analyses {
            stats.total_entries += 1;
            for (category, score) in analysis.scores.iter() {
                sums.set(category, sums.get(category) + score);
            }
            stats.sentiment_distribution.record(analysis.sentiment_label);
            *stats.emotion_distribution.slot(analysis.dominant_emotion) += 1;
            for keyword in &analysis.keywords {
                *keyword_counts.entry(keyword.as_str()).or_default() += 1;
            }
        }

        if stats.total_entries == 0 {
            return stats;
        }

        let count = stats.total_entries as f64;
        stats.average_emotions = EmotionScores::from_fn(|c| sums.get(c) / count);

        let mut ranked: Vec<KeywordFrequency> = keyword_counts
            .into_iter()
            .map(|(keyword, count)| KeywordFrequency {
                keyword: keyword.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
        ranked.truncate(TOP_KEYWORDS_LIMIT);
        stats.top_keywords = ranked;

        stats
    }
}
