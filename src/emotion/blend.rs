//! Weighted blending of a local and an external analysis.

use super::{
    clamp_signed, clamp_unit, dedup_keywords, AnalysisMethod, DominantEmotion, EmotionAnalysis,
    EmotionScores, SentimentLabel,
};
use crate::constants::{DOMINANT_THRESHOLD, EXTERNAL_BLEND_WEIGHT, LOCAL_BLEND_WEIGHT};

fn mix(local: f64, external: f64) -> f64 {
    local * LOCAL_BLEND_WEIGHT + external * EXTERNAL_BLEND_WEIGHT
}

/// Blends two analyses at 0.4 local / 0.6 external.
///
/// Scores, confidence and sentiment score are averaged independently. The
/// dominant emotion and sentiment label are recomputed from the blended
/// numbers, and keyword sets are unioned.
pub fn blend(local: &EmotionAnalysis, external: &EmotionAnalysis) -> EmotionAnalysis {
    let scores = EmotionScores::from_fn(|c| {
        clamp_unit(mix(local.scores.get(c), external.scores.get(c)))
    });
    let sentiment_score = clamp_signed(mix(local.sentiment_score, external.sentiment_score));
    let mut confidence = clamp_unit(mix(local.confidence, external.confidence));

    let (dominant_emotion, _) = scores.dominant();
    if dominant_emotion == DominantEmotion::Neutral {
        confidence = confidence.max(DOMINANT_THRESHOLD);
    }

    let keywords = dedup_keywords(
        local
            .keywords
            .iter()
            .chain(external.keywords.iter())
            .cloned(),
    );

    EmotionAnalysis {
        scores,
        dominant_emotion,
        confidence,
        sentiment_score,
        sentiment_label: SentimentLabel::from_score(sentiment_score),
        keywords,
        analysis_method: AnalysisMethod::EnhancedAi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Category;

    fn profile(scores: EmotionScores, confidence: f64, sentiment: f64, keywords: &[&str]) -> EmotionAnalysis {
        let mut analysis = EmotionAnalysis::from_scores(
            scores,
            sentiment,
            keywords.iter().map(|k| k.to_string()).collect(),
            AnalysisMethod::Enhanced,
        );
        analysis.confidence = confidence;
        analysis
    }

    #[test]
    fn test_blend_weights_each_field() {
        let local = profile(
            EmotionScores { joy: 0.8, ..Default::default() },
            0.8,
            0.5,
            &["开心"],
        );
        let external = profile(
            EmotionScores { joy: 0.2, ..Default::default() },
            0.2,
            -0.5,
            &["happy"],
        );

        let blended = blend(&local, &external);
        assert!((blended.scores.joy - 0.44).abs() < 1e-9);
        assert!((blended.confidence - 0.44).abs() < 1e-9);
        assert!((blended.sentiment_score - (-0.1)).abs() < 1e-9);
        assert_eq!(blended.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(blended.analysis_method, AnalysisMethod::EnhancedAi);
        assert_eq!(blended.dominant_emotion, DominantEmotion::Category(Category::Joy));
    }

    #[test]
    fn test_blend_recomputes_dominant() {
        let local = profile(
            EmotionScores { anger: 0.9, fear: 0.1, ..Default::default() },
            0.9,
            -0.9,
            &[],
        );
        let external = profile(
            EmotionScores { anger: 0.0, fear: 0.8, ..Default::default() },
            0.8,
            -0.6,
            &[],
        );

        let blended = blend(&local, &external);
        // anger 0.36, fear 0.52
        assert_eq!(blended.dominant_emotion, DominantEmotion::Category(Category::Fear));
        assert_eq!(blended.sentiment_label, SentimentLabel::Negative);
    }

    #[test]
    fn test_blend_low_scores_fall_to_neutral() {
        let local = profile(EmotionScores { love: 0.1, ..Default::default() }, 0.0, 0.0, &[]);
        let external = profile(EmotionScores { love: 0.05, ..Default::default() }, 0.0, 0.0, &[]);

        let blended = blend(&local, &external);
        assert_eq!(blended.dominant_emotion, DominantEmotion::Neutral);
        assert_eq!(blended.confidence, 0.1);
    }

    #[test]
    fn test_blend_unions_keywords() {
        let local = profile(EmotionScores::default(), 0.1, 0.0, &["a", "b"]);
        let external = profile(EmotionScores::default(), 0.1, 0.0, &["b", "c"]);

        let mut keywords = blend(&local, &external).keywords;
        keywords.sort();
        assert_eq!(keywords, vec!["a", "b", "c"]);
    }
}
