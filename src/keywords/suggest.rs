//! Alias suggestions for keywords that survived consolidation unaliased.

use strsim::jaro_winkler;
use tracing::instrument;

use super::aliases::AliasTable;
use super::normalizer::KeywordMap;

/// Default Jaro-Winkler similarity above which two keywords are reported.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// A pair of keywords that probably name the same topic.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasSuggestion {
    /// Keyword with more records (kept as canonical form).
    pub canonical: String,
    /// Keyword that could be listed as an alias of `canonical`.
    pub alias: String,
    /// Jaro-Winkler similarity of the lowercased pair.
    pub similarity: f64,
}

/// Finds keyword pairs whose lowercase forms are at least `threshold` similar.
///
/// Pairs where both sides are already canonical keywords of `aliases` are
/// skipped: those were consolidated on purpose. Results are ordered by
/// descending similarity.
#[must_use]
#[instrument(skip(map, aliases), fields(keywords = map.len()))]
pub fn suggest_aliases(
    map: &KeywordMap,
    aliases: &AliasTable,
    threshold: f64,
) -> Vec<AliasSuggestion> {
    let keywords: Vec<(&str, usize)> = map.iter().map(|(k, set)| (k, set.len())).collect();
    let mut suggestions = Vec::new();

    for (i, (left, left_count)) in keywords.iter().enumerate() {
        for (right, right_count) in &keywords[i + 1..] {
            if aliases.aliases_of(left).is_some() && aliases.aliases_of(right).is_some() {
                continue;
            }
            let similarity = jaro_winkler(&left.to_lowercase(), &right.to_lowercase());
            if similarity < threshold {
                continue;
            }
            let (canonical, alias) = if left_count >= right_count {
                (left, right)
            } else {
                (right, left)
            };
            suggestions.push(AliasSuggestion {
                canonical: (*canonical).to_string(),
                alias: (*alias).to_string(),
                similarity,
            });
        }
    }

    suggestions.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    suggestions
}
