//! Lexical emotion scoring.
//!
//! Text is lowercased and split on whitespace. Non-CJK pieces lose their
//! surrounding punctuation; CJK pieces are segmented by forward maximum
//! matching against the lexicon vocabulary, unmatched ideographs becoming
//! single-character tokens. Keywords are then matched by position and
//! weighted by their intensity tier and nearby context modifiers.

use super::lexicon::{EmotionLexicon, Intensity};
use super::{AnalysisMethod, Category, EmotionAnalysis, EmotionScores};
use crate::constants::{
    DIMINISHER_MULTIPLIER, INTENSIFIER_MULTIPLIER, MODIFIER_WINDOW, NEGATION_MULTIPLIER,
    NEGATION_WINDOW, SCORE_SCALE,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Context modifier applied to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Negation,
    Intensifier,
    Diminisher,
}

impl Modifier {
    pub fn multiplier(&self) -> f64 {
        match self {
            Modifier::Negation => NEGATION_MULTIPLIER,
            Modifier::Intensifier => INTENSIFIER_MULTIPLIER,
            Modifier::Diminisher => DIMINISHER_MULTIPLIER,
        }
    }
}

/// One occurrence of a lexicon keyword in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub keyword: String,
    pub category: Category,
    pub intensity: Intensity,
    pub position: usize,
    /// Tier weight after the modifier, if any; negative when negated
    pub weight: f64,
    pub modifier: Option<Modifier>,
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF)
}

/// Splits text into lowercase word tokens.
pub fn tokenize(text: &str, lexicon: &EmotionLexicon) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();

    for piece in lowered.split_whitespace() {
        let chars: Vec<char> = piece.chars().collect();
        let mut start = 0;
        while start < chars.len() {
            let cjk = is_cjk(chars[start]);
            let mut end = start;
            while end < chars.len() && is_cjk(chars[end]) == cjk {
                end += 1;
            }
            let run = &chars[start..end];
            if cjk {
                segment_cjk(run, lexicon, &mut tokens);
            } else {
                let word: String = run.iter().collect();
                let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
                if !trimmed.is_empty() {
                    tokens.push(trimmed.to_string());
                }
            }
            start = end;
        }
    }

    tokens
}

/// Forward maximum matching over a run of ideographs.
fn segment_cjk(run: &[char], lexicon: &EmotionLexicon, tokens: &mut Vec<String>) {
    let mut i = 0;
    while i < run.len() {
        let longest = lexicon.max_term_chars().min(run.len() - i);
        let mut taken = 1;
        for len in (2..=longest).rev() {
            let candidate: String = run[i..i + len].iter().collect();
            if lexicon.contains_term(&candidate) {
                taken = len;
                break;
            }
        }
        tokens.push(run[i..i + taken].iter().collect());
        i += taken;
    }
}

/// Maps each token to the positions where it occurs.
pub fn position_index(tokens: &[String]) -> HashMap<&str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        index.entry(token.as_str()).or_default().push(position);
    }
    index
}

fn has_modifier_near(
    tokens: &[String],
    position: usize,
    terms: &HashSet<String>,
    distance: usize,
) -> bool {
    let start = position.saturating_sub(distance);
    let end = (position + distance + 1).min(tokens.len());
    (start..end)
        .filter(|&i| i != position)
        .any(|i| terms.contains(&tokens[i]))
}

/// First modifier found near `position`, checked negation first.
fn find_modifier(tokens: &[String], position: usize, lexicon: &EmotionLexicon) -> Option<Modifier> {
    let modifiers = lexicon.modifiers();
    if has_modifier_near(tokens, position, &modifiers.negation, NEGATION_WINDOW) {
        Some(Modifier::Negation)
    } else if has_modifier_near(tokens, position, &modifiers.intensifiers, MODIFIER_WINDOW) {
        Some(Modifier::Intensifier)
    } else if has_modifier_near(tokens, position, &modifiers.diminishers, MODIFIER_WINDOW) {
        Some(Modifier::Diminisher)
    } else {
        None
    }
}

/// Finds every keyword occurrence in the tokens, with modifiers applied.
pub fn find_matches(tokens: &[String], lexicon: &EmotionLexicon) -> Vec<KeywordMatch> {
    let index = position_index(tokens);
    let mut matches = Vec::new();

    for category in Category::ALL {
        for keyword in lexicon.keywords(category) {
            let Some(positions) = index.get(keyword.as_str()) else {
                continue;
            };
            let intensity = lexicon.intensity(category, keyword);
            for &position in positions {
                let modifier = find_modifier(tokens, position, lexicon);
                let weight = intensity.weight() * modifier.map_or(1.0, |m| m.multiplier());
                matches.push(KeywordMatch {
                    keyword: keyword.clone(),
                    category,
                    intensity,
                    position,
                    weight,
                    modifier,
                });
            }
        }
    }

    matches
}

fn density(sum: f64, total_words: usize) -> f64 {
    sum / total_words.max(1) as f64 * SCORE_SCALE
}

/// Scores text with the weighted lexical engine (`enhanced` method).
pub fn analyze(text: &str, lexicon: &EmotionLexicon) -> EmotionAnalysis {
    let tokens = tokenize(text, lexicon);
    let matches = find_matches(&tokens, lexicon);
    let total_words = tokens.len().max(1);

    let mut sums: HashMap<Category, f64> = HashMap::new();
    let mut positive = 0.0;
    let mut negative = 0.0;
    for m in &matches {
        *sums.entry(m.category).or_default() += m.weight.abs();
        if m.category.is_positive() {
            positive += m.weight.abs();
        } else {
            negative += m.weight.abs();
        }
    }

    let scores = EmotionScores::from_fn(|c| {
        density(sums.get(&c).copied().unwrap_or(0.0), total_words)
    });
    let sentiment = density(positive - negative, total_words);

    debug!(
        "Lexical analysis: {} tokens, {} matches",
        tokens.len(),
        matches.len()
    );

    EmotionAnalysis::from_scores(
        scores,
        sentiment,
        matches.into_iter().map(|m| m.keyword).collect(),
        AnalysisMethod::Enhanced,
    )
}

/// Scores text by distinct keyword presence (`programmatic` method).
///
/// No tiers or modifiers: each category scores the number of its keywords
/// present, and sentiment compares present positive and negative terms.
pub fn analyze_keywords(text: &str, lexicon: &EmotionLexicon) -> EmotionAnalysis {
    let tokens = tokenize(text, lexicon);
    let present: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    let total_words = tokens.len().max(1);

    let mut keywords = Vec::new();
    let scores = EmotionScores::from_fn(|category| {
        let found: Vec<&String> = lexicon
            .keywords(category)
            .iter()
            .filter(|k| present.contains(k.as_str()))
            .collect();
        keywords.extend(found.iter().map(|k| k.to_string()));
        density(found.len() as f64, total_words)
    });

    let count_present = |terms: &[String]| {
        terms
            .iter()
            .filter(|t| present.contains(t.as_str()))
            .count() as f64
    };
    let sentiment = density(
        count_present(lexicon.positive_terms()) - count_present(lexicon.negative_terms()),
        total_words,
    );

    EmotionAnalysis::from_scores(scores, sentiment, keywords, AnalysisMethod::Programmatic)
}
