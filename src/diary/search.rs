//! Case-insensitive search over an owner's decrypted diaries.
//!
//! Search runs on the output of [`DiaryStore::list_decrypted`], so locked
//! diaries are matched against their placeholder text only.

use super::{DiaryEntry, DiaryStore};
use crate::constants::MAX_SNIPPETS_PER_DIARY;
use crate::errors::AppResult;
use serde::Serialize;
use tracing::debug;

/// Where a search hit was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Title,
    Content,
    Both,
}

/// A diary hit with surrounding text.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub entry: DiaryEntry,
    pub match_type: MatchType,
    pub snippets: Vec<String>,
}

impl DiaryStore {
    /// Diaries whose title or content contains `query`, ignoring case.
    ///
    /// An empty query matches every diary.
    pub fn search(&self, owner_id: i64, master_key: &[u8], query: &str) -> AppResult<Vec<DiaryEntry>> {
        let needle = fold(query);
        let entries: Vec<DiaryEntry> = self
            .list_decrypted(owner_id, master_key)?
            .into_iter()
            .filter(|entry| classify(entry, &needle).is_some())
            .collect();

        debug!("Search for owner {} matched {} diaries", owner_id, entries.len());
        Ok(entries)
    }

    /// Like [`search`](Self::search), with match classification and up to
    /// three content snippets of `context_len` characters on each side of a
    /// hit. Title-only matches carry no snippets.
    ///
    /// An empty query yields no results.
    pub fn search_with_context(
        &self,
        owner_id: i64,
        master_key: &[u8],
        query: &str,
        context_len: usize,
    ) -> AppResult<Vec<SearchResult>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let needle = fold(query);
        let mut results = Vec::new();
        for entry in self.list_decrypted(owner_id, master_key)? {
            let Some(match_type) = classify(&entry, &needle) else {
                continue;
            };
            // Snippets come from content only
            let snippets = match match_type {
                MatchType::Title => Vec::new(),
                MatchType::Content | MatchType::Both => extract_snippets(
                    entry.content.display_text(),
                    query,
                    context_len,
                    MAX_SNIPPETS_PER_DIARY,
                ),
            };
            results.push(SearchResult {
                entry,
                match_type,
                snippets,
            });
        }

        debug!(
            "Context search for owner {} matched {} diaries",
            owner_id,
            results.len()
        );
        Ok(results)
    }
}

fn classify(entry: &DiaryEntry, needle: &[char]) -> Option<MatchType> {
    let in_title = find_folded(&fold(&entry.title), needle, 0).is_some();
    let in_content = find_folded(&fold(entry.content.display_text()), needle, 0).is_some();
    match (in_title, in_content) {
        (true, true) => Some(MatchType::Both),
        (true, false) => Some(MatchType::Title),
        (false, true) => Some(MatchType::Content),
        (false, false) => None,
    }
}

/// Lowercases per character so folded and original text share indices.
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find_folded(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Extracts up to `max` windows around successive non-overlapping
/// occurrences of `query`.
///
/// Each window keeps `context_len` characters on either side of the hit and
/// is marked with `...` where it stops short of the text boundary.
pub fn extract_snippets(text: &str, query: &str, context_len: usize, max: usize) -> Vec<String> {
    let needle = fold(query);
    if needle.is_empty() || max == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let folded = fold(text);
    let mut snippets = Vec::new();
    let mut from = 0;

    while snippets.len() < max {
        let Some(hit) = find_folded(&folded, &needle, from) else {
            break;
        };
        let hit_end = hit + needle.len();
        let start = hit.saturating_sub(context_len);
        let end = (hit_end + context_len).min(chars.len());

        let mut snippet = String::new();
        if start > 0 {
            snippet.push_str("...");
        }
        snippet.extend(&chars[start..end]);
        if end < chars.len() {
            snippet.push_str("...");
        }
        snippets.push(snippet);
        from = hit_end;
    }

    snippets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_marks_truncated_edges() {
        let text = "aaaaaaaaaa needle bbbbbbbbbb";
        let snippets = extract_snippets(text, "needle", 3, 3);
        assert_eq!(snippets, vec!["...aa needle bb..."]);
    }

    #[test]
    fn test_snippet_without_markers_at_boundaries() {
        let snippets = extract_snippets("needle", "needle", 10, 3);
        assert_eq!(snippets, vec!["needle"]);
    }

    #[test]
    fn test_snippets_capped_and_case_insensitive() {
        let text = "Rain. rain. RAIN. rain.";
        let snippets = extract_snippets(text, "rain", 0, 3);
        assert_eq!(snippets.len(), 3);
        assert!(snippets[0].starts_with("Rain"));
        assert!(snippets[2].contains("RAIN"));
    }

    #[test]
    fn test_snippets_handle_multibyte_text() {
        let text = "今天下雨了，我很难过，但是晚上很开心";
        let snippets = extract_snippets(text, "难过", 2, 3);
        assert_eq!(snippets, vec!["...我很难过，但..."]);
    }

    #[test]
    fn test_empty_query_has_no_snippets() {
        assert!(extract_snippets("anything", "", 5, 3).is_empty());
    }

    #[test]
    fn test_find_folded_bounds() {
        let hay = fold("abc");
        assert_eq!(find_folded(&hay, &fold("c"), 0), Some(2));
        assert_eq!(find_folded(&hay, &fold("abcd"), 0), None);
        assert_eq!(find_folded(&hay, &fold("a"), 1), None);
    }
}
