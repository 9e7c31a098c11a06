//! Keyword normalization and alias consolidation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use super::aliases::AliasTable;
use super::frequency::FrequencySeries;
use crate::record::Record;

/// Lowercased raw keyword -> record indices, duplicates allowed.
pub type RawKeywordMap = BTreeMap<String, Vec<usize>>;

/// Buckets every record index under each keyword it lists.
///
/// Keyword strings are split on commas, trimmed and lowercased. Records
/// without a keyword field are skipped, as are empty tokens (`"a,,b"`).
#[must_use]
#[instrument(skip(records), fields(records = records.len()))]
pub fn collect_raw_keywords(records: &[Record]) -> RawKeywordMap {
    let mut raw = RawKeywordMap::new();
    for record in records {
        let Some(keywords) = record.keywords.as_deref() else {
            continue;
        };
        for token in keywords.split(',') {
            let keyword = token.trim().to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            raw.entry(keyword).or_default().push(record.index);
        }
    }
    debug!(raw_keywords = raw.len(), "Collected raw keywords");
    raw
}

/// Collapses raw keywords into their canonical forms.
///
/// For each canonical keyword, every raw key whose lowercase form is one of
/// its aliases is removed from `raw` and its bucket appended (not unioned) to
/// the canonical list. Canonical keywords without a hit are omitted. Raw keys
/// matching no alias survive under their own name.
///
/// # Panics
///
/// Panics if the number of (keyword, record) associations changes, which
/// happens when a canonical keyword collides with a surviving raw keyword.
/// That is a broken alias table, not a data problem, so it is not recoverable.
#[must_use]
#[instrument(skip_all, fields(raw_keywords = raw.len(), canonical = aliases.len()))]
pub fn consolidate(mut raw: RawKeywordMap, aliases: &AliasTable) -> RawKeywordMap {
    let total = association_count(&raw);
    let mut consolidated = RawKeywordMap::new();

    for (canonical, alias_set) in aliases.iter() {
        let matching: Vec<String> = raw
            .keys()
            .filter(|key| alias_set.contains(&key.to_lowercase()))
            .cloned()
            .collect();

        let mut merged = Vec::new();
        for key in matching {
            if let Some(bucket) = raw.remove(&key) {
                merged.extend(bucket);
            }
        }
        if !merged.is_empty() {
            debug!(canonical, mentions = merged.len(), "Consolidated aliases");
            consolidated.insert(canonical.to_string(), merged);
        }
    }

    for (keyword, bucket) in raw {
        consolidated.insert(keyword, bucket);
    }

    let after = association_count(&consolidated);
    assert_eq!(
        after, total,
        "keyword consolidation changed association count ({total} -> {after}); \
         a canonical keyword collides with an unaliased raw keyword"
    );
    consolidated
}

fn association_count(map: &RawKeywordMap) -> usize {
    map.values().map(Vec::len).sum()
}

/// Canonical keyword -> set of record indices.
///
/// Built once from the records; afterwards the only mutation is
/// [`KeywordMap::remove_record`], used when browsing in pop mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMap {
    entries: BTreeMap<String, BTreeSet<usize>>,
}

impl KeywordMap {
    /// Collects, consolidates and deduplicates the keywords of `records`.
    ///
    /// # Panics
    ///
    /// See [`consolidate`].
    #[must_use]
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(records: &[Record], aliases: &AliasTable) -> Self {
        let raw = collect_raw_keywords(records);
        Self::from_consolidated(consolidate(raw, aliases))
    }

    /// Deduplicates each keyword's record list.
    #[must_use]
    pub fn from_consolidated(consolidated: RawKeywordMap) -> Self {
        let entries = consolidated
            .into_iter()
            .map(|(keyword, indices)| (keyword, indices.into_iter().collect()))
            .collect();
        Self { entries }
    }

    /// Record indices tagged with `keyword`, in record order.
    #[must_use]
    pub fn records_for(&self, keyword: &str) -> Option<&BTreeSet<usize>> {
        self.entries.get(keyword)
    }

    /// Removes one record from one keyword's set. Other keywords are untouched.
    ///
    /// Returns `true` if the record was present.
    pub fn remove_record(&mut self, keyword: &str, index: usize) -> bool {
        self.entries
            .get_mut(keyword)
            .is_some_and(|set| set.remove(&index))
    }

    /// Keyword -> number of associated records.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.entries
            .iter()
            .map(|(keyword, set)| (keyword.clone(), set.len()))
            .collect()
    }

    /// Snapshot of the counts sorted by descending frequency.
    #[must_use]
    pub fn frequency_series(&self) -> FrequencySeries {
        FrequencySeries::from_counts(self.counts())
    }

    /// Total (keyword, record) associations after deduplication.
    #[must_use]
    pub fn total_mentions(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<usize>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
