//! Emotion lexicon: keywords, intensity tiers and context modifiers.
//!
//! The lexicon is loaded once per process behind [`ensure_loaded`]. Loading
//! tries an explicit file, then the well-known search paths, and falls back to
//! a built-in Chinese/English dictionary. Once loaded it never changes.
//!
//! File format (JSON, or the same shape as YAML for `.yaml`/`.yml` paths):
//!
//! ```json
//! {
//!   "emotions": {
//!     "joy": { "keywords": ["开心", "happy"], "intensity": { "high": ["狂喜"], "low": ["满足"] } }
//!   },
//!   "sentiment": { "positive": { "keywords": ["好"] }, "negative": { "keywords": ["坏"] } },
//!   "context_modifiers": { "negation": ["不", "not"], "intensifiers": ["非常"], "diminishers": ["有点"] }
//! }
//! ```

use super::Category;
use crate::constants::{LEXICON_SEARCH_PATHS, WEIGHT_HIGH, WEIGHT_LOW, WEIGHT_MEDIUM};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static LEXICON: OnceLock<EmotionLexicon> = OnceLock::new();

/// Returns the process-wide lexicon, loading it on first use.
///
/// Only the first call's `explicit_path` is honored; later calls, including
/// concurrent ones racing the first, observe the lexicon that won.
pub fn ensure_loaded(explicit_path: Option<&Path>) -> &'static EmotionLexicon {
    LEXICON.get_or_init(|| EmotionLexicon::load(explicit_path))
}

/// Returns the process-wide lexicon, loading it from the search paths if needed.
pub fn global() -> &'static EmotionLexicon {
    ensure_loaded(None)
}

/// Intensity tier of a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intensity {
    High,
    Medium,
    Low,
}

impl Intensity {
    /// Base weight of a match at this tier.
    pub fn weight(&self) -> f64 {
        match self {
            Intensity::High => WEIGHT_HIGH,
            Intensity::Medium => WEIGHT_MEDIUM,
            Intensity::Low => WEIGHT_LOW,
        }
    }
}

/// Where the loaded lexicon came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconSource {
    BuiltIn,
    /// Parsed from caller-supplied text.
    Inline,
    File(PathBuf),
}

/// Terms that change the weight of a nearby keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextModifiers {
    pub negation: HashSet<String>,
    pub intensifiers: HashSet<String>,
    pub diminishers: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
struct CategoryEntry {
    keywords: Vec<String>,
    tiers: HashMap<String, Intensity>,
}

/// Immutable keyword dictionary shared by all scoring calls.
#[derive(Debug, Clone)]
pub struct EmotionLexicon {
    categories: HashMap<Category, CategoryEntry>,
    positive_terms: Vec<String>,
    negative_terms: Vec<String>,
    modifiers: ContextModifiers,
    vocabulary: HashSet<String>,
    max_term_chars: usize,
    source: LexiconSource,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    emotions: HashMap<String, CategoryFile>,
    #[serde(default)]
    sentiment: HashMap<String, TermListFile>,
    #[serde(default)]
    context_modifiers: ModifierFile,
}

#[derive(Debug, Default, Deserialize)]
struct CategoryFile {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    intensity: IntensityFile,
}

#[derive(Debug, Default, Deserialize)]
struct IntensityFile {
    #[serde(default)]
    high: Vec<String>,
    #[serde(default)]
    medium: Vec<String>,
    #[serde(default)]
    low: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TermListFile {
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModifierFile {
    #[serde(default)]
    negation: Vec<String>,
    #[serde(default)]
    intensifiers: Vec<String>,
    #[serde(default)]
    diminishers: Vec<String>,
}

fn normalize(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl EmotionLexicon {
    /// Loads the lexicon: explicit path, then search paths, then built-in.
    ///
    /// Never fails; unreadable or malformed files are logged and skipped.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let candidates = explicit_path
            .map(Path::to_path_buf)
            .into_iter()
            .chain(LEXICON_SEARCH_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            if !path.exists() {
                debug!("No lexicon file at {:?}", path);
                continue;
            }
            match Self::from_file(&path) {
                Ok(lexicon) => {
                    info!("Loaded emotion lexicon from {:?}", path);
                    return lexicon;
                }
                Err(e) => warn!("Ignoring lexicon file {:?}: {}", path, e),
            }
        }

        info!("Using built-in emotion lexicon");
        Self::builtin()
    }

    /// Parses a lexicon definition file, as YAML when the extension is
    /// `.yaml`/`.yml` and as JSON otherwise.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let data = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let file = if is_yaml {
            parse_yaml(&data)?
        } else {
            parse_json(&data)?
        };
        Self::from_definition(file, LexiconSource::File(path.to_path_buf()))
    }

    /// Parses a lexicon definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the JSON is malformed or defines none of
    /// the known categories.
    pub fn from_json(data: &str) -> AppResult<Self> {
        Self::from_definition(parse_json(data)?, LexiconSource::Inline)
    }

    /// Parses a lexicon definition from YAML text.
    pub fn from_yaml(data: &str) -> AppResult<Self> {
        Self::from_definition(parse_yaml(data)?, LexiconSource::Inline)
    }

    fn from_definition(file: LexiconFile, source: LexiconSource) -> AppResult<Self> {
        let mut categories = HashMap::new();
        for (name, definition) in &file.emotions {
            match name.parse::<Category>() {
                Ok(category) => {
                    categories.insert(category, Self::build_category(definition));
                }
                Err(_) => warn!("Skipping unknown lexicon category '{}'", name),
            }
        }

        if categories.is_empty() {
            return Err(AppError::Config(
                "lexicon definition has no known emotion categories".to_string(),
            ));
        }

        let modifiers = ContextModifiers {
            negation: normalize(&file.context_modifiers.negation).into_iter().collect(),
            intensifiers: normalize(&file.context_modifiers.intensifiers).into_iter().collect(),
            diminishers: normalize(&file.context_modifiers.diminishers).into_iter().collect(),
        };

        let sentiment_terms = |label: &str| -> Option<Vec<String>> {
            file.sentiment
                .get(label)
                .map(|list| normalize(&list.keywords))
        };

        Ok(Self::assemble(
            categories,
            sentiment_terms("positive"),
            sentiment_terms("negative"),
            modifiers,
            source,
        ))
    }

    fn build_category(definition: &CategoryFile) -> CategoryEntry {
        let mut entry = CategoryEntry::default();
        let tiered = [
            (&definition.intensity.high, Intensity::High),
            (&definition.intensity.low, Intensity::Low),
            (&definition.intensity.medium, Intensity::Medium),
        ];

        // High wins over low, low over medium
        for (terms, intensity) in tiered {
            for term in normalize(terms) {
                entry.tiers.entry(term).or_insert(intensity);
            }
        }

        let all_terms = normalize(&definition.keywords)
            .into_iter()
            .chain(normalize(&definition.intensity.high))
            .chain(normalize(&definition.intensity.medium))
            .chain(normalize(&definition.intensity.low));
        let mut seen = HashSet::new();
        for term in all_terms {
            if seen.insert(term.clone()) {
                entry.keywords.push(term);
            }
        }

        entry
    }

    fn assemble(
        mut categories: HashMap<Category, CategoryEntry>,
        positive_terms: Option<Vec<String>>,
        negative_terms: Option<Vec<String>>,
        modifiers: ContextModifiers,
        source: LexiconSource,
    ) -> Self {
        for category in Category::ALL {
            categories.entry(category).or_default();
        }

        // Without explicit sentiment lists, polarity follows the categories
        let polarity_terms = |positive: bool| -> Vec<String> {
            let mut terms: Vec<String> = Category::ALL
                .iter()
                .filter(|c| c.is_positive() == positive)
                .flat_map(|c| categories[c].keywords.iter().cloned())
                .collect();
            terms.sort();
            terms.dedup();
            terms
        };
        let positive_terms = positive_terms.unwrap_or_else(|| polarity_terms(true));
        let negative_terms = negative_terms.unwrap_or_else(|| polarity_terms(false));

        let vocabulary: HashSet<String> = categories
            .values()
            .flat_map(|entry| entry.keywords.iter().cloned())
            .chain(positive_terms.iter().cloned())
            .chain(negative_terms.iter().cloned())
            .chain(modifiers.negation.iter().cloned())
            .chain(modifiers.intensifiers.iter().cloned())
            .chain(modifiers.diminishers.iter().cloned())
            .collect();
        let max_term_chars = vocabulary
            .iter()
            .map(|term| term.chars().count())
            .max()
            .unwrap_or(1);

        debug!(
            "Assembled lexicon with {} vocabulary terms (longest {} chars)",
            vocabulary.len(),
            max_term_chars
        );

        Self {
            categories,
            positive_terms,
            negative_terms,
            modifiers,
            vocabulary,
            max_term_chars,
            source,
        }
    }

    /// The built-in dictionary used when no file is available.
    pub fn builtin() -> Self {
        let mut categories = HashMap::new();
        let to_vec = |terms: &[&str]| -> Vec<String> { terms.iter().map(|t| t.to_string()).collect() };
        for &(category, keywords, high, low) in BUILTIN_CATEGORIES {
            let definition = CategoryFile {
                keywords: to_vec(keywords),
                intensity: IntensityFile {
                    high: to_vec(high),
                    medium: Vec::new(),
                    low: to_vec(low),
                },
            };
            categories.insert(category, Self::build_category(&definition));
        }

        let to_set =
            |terms: &[&str]| -> HashSet<String> { terms.iter().map(|t| t.to_string()).collect() };
        let modifiers = ContextModifiers {
            negation: to_set(BUILTIN_NEGATION),
            intensifiers: to_set(BUILTIN_INTENSIFIERS),
            diminishers: to_set(BUILTIN_DIMINISHERS),
        };

        Self::assemble(categories, None, None, modifiers, LexiconSource::BuiltIn)
    }

    /// All keywords of a category (keywords plus every tiered term).
    pub fn keywords(&self, category: Category) -> &[String] {
        self.categories
            .get(&category)
            .map(|entry| entry.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Tier of a keyword within a category; untiered keywords are medium.
    pub fn intensity(&self, category: Category, keyword: &str) -> Intensity {
        self.categories
            .get(&category)
            .and_then(|entry| entry.tiers.get(keyword).copied())
            .unwrap_or(Intensity::Medium)
    }

    pub fn modifiers(&self) -> &ContextModifiers {
        &self.modifiers
    }

    /// Terms counted as positive by basic keyword scoring.
    pub fn positive_terms(&self) -> &[String] {
        &self.positive_terms
    }

    /// Terms counted as negative by basic keyword scoring.
    pub fn negative_terms(&self) -> &[String] {
        &self.negative_terms
    }

    /// Whether a term is a keyword or modifier, used to segment CJK text.
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains(term)
    }

    /// Length in chars of the longest vocabulary term.
    pub fn max_term_chars(&self) -> usize {
        self.max_term_chars
    }

    pub fn source(&self) -> &LexiconSource {
        &self.source
    }
}

type BuiltinCategory = (Category, &'static [&'static str], &'static [&'static str], &'static [&'static str]);

// (category, keywords, high tier, low tier); anything else is medium
const BUILTIN_CATEGORIES: &[BuiltinCategory] = &[
    (
        Category::Joy,
        &[
            "开心", "快乐", "高兴", "愉快", "欢乐", "喜悦", "happy", "joy", "glad", "cheerful",
            "joyful", "great", "wonderful",
        ],
        &["狂喜", "欣喜若狂", "兴奋", "幸福", "ecstatic", "thrilled", "overjoyed", "delighted", "excited"],
        &["满足", "欣慰", "舒心", "content", "pleased", "satisfied"],
    ),
    (
        Category::Sadness,
        &["伤心", "难过", "悲伤", "哭", "孤独", "沮丧", "sad", "unhappy", "lonely", "upset", "cry", "depressed"],
        &["痛苦", "绝望", "心碎", "悲痛", "heartbroken", "devastated", "despair", "miserable"],
        &["失落", "郁闷", "失望", "低落", "disappointed", "gloomy", "down"],
    ),
    (
        Category::Anger,
        &["生气", "气愤", "发火", "angry", "mad", "hate", "frustrated"],
        &["愤怒", "暴怒", "气炸", "furious", "rage", "enraged", "livid"],
        &["烦躁", "恼火", "不满", "annoyed", "irritated"],
    ),
    (
        Category::Fear,
        &["害怕", "焦虑", "担忧", "afraid", "scared", "fear", "anxious", "frightened"],
        &["恐惧", "惊恐", "恐慌", "terrified", "horrified", "panic"],
        &["担心", "紧张", "不安", "nervous", "uneasy", "worried"],
    ),
    (
        Category::Love,
        &["爱", "爱情", "感动", "思念", "想念", "珍惜", "温柔", "love", "loving", "affection", "miss"],
        &["深爱", "热爱", "挚爱", "adore", "cherish"],
        &["喜欢", "温暖", "好感", "fond", "warm"],
    ),
    (
        Category::Surprise,
        &["惊讶", "惊喜", "吃惊", "惊奇", "没想到", "surprised", "amazed", "wow"],
        &["震惊", "目瞪口呆", "astonished", "stunned", "shocked"],
        &["意外", "unexpected", "curious"],
    ),
    (
        Category::Disgust,
        &["厌恶", "讨厌", "鄙视", "disgusted", "gross", "nasty", "awful", "yuck"],
        &["恶心", "作呕", "disgusting", "revolting", "repulsive"],
        &["反感", "嫌弃", "dislike"],
    ),
];

fn parse_json(data: &str) -> AppResult<LexiconFile> {
    serde_json::from_str(data)
        .map_err(|e| AppError::Config(format!("invalid lexicon definition: {}", e)))
}

fn parse_yaml(data: &str) -> AppResult<LexiconFile> {
    serde_yaml::from_str(data)
        .map_err(|e| AppError::Config(format!("invalid lexicon definition: {}", e)))
}

const BUILTIN_NEGATION: &[&str] = &["不", "没", "无", "非", "未", "别", "not", "no", "never", "none", "don't", "didn't", "isn't", "wasn't"];
const BUILTIN_INTENSIFIERS: &[&str] = &[
    "非常", "特别", "极其", "超级", "相当", "很", "十分", "extremely", "very", "really", "quite", "so", "too",
];
const BUILTIN_DIMINISHERS: &[&str] = &["有点", "稍微", "略", "轻微", "一点", "slightly", "somewhat", "bit", "little"];
