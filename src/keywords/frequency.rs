//! Frequency-ranked keyword series and the text report.

use std::io::{self, Write};

/// Width of the keyword column in the report.
const KEYWORD_COLUMN: usize = 32;

/// Keyword counts sorted by descending count, ties broken by keyword.
///
/// A series is a snapshot: it does not follow later [`KeywordMap`] removals,
/// so the display order stays stable during a browsing session.
///
/// [`KeywordMap`]: super::KeywordMap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencySeries {
    entries: Vec<(String, usize)>,
}

impl FrequencySeries {
    /// Builds a sorted series from `(keyword, count)` pairs.
    #[must_use]
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut entries: Vec<_> = counts.into_iter().collect();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Count for one keyword as of the snapshot.
    #[must_use]
    pub fn count_of(&self, keyword: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, c)| *c)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Largest count, or 0 for an empty series.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.entries.first().map_or(0, |(_, c)| *c)
    }

    /// Keeps only the `limit` most frequent keywords.
    #[must_use]
    pub fn top(&self, limit: usize) -> Self {
        Self {
            entries: self.entries.iter().take(limit).cloned().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes one `keyword count` line per entry, then a summary line.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_report<W: Write>(&self, out: &mut W, record_count: usize) -> io::Result<()> {
        for (keyword, count) in self.iter() {
            writeln!(out, "{keyword:<KEYWORD_COLUMN$} {count}")?;
        }
        writeln!(
            out,
            "{} unique keywords mentioned {} times in {} entries",
            self.len(),
            self.total(),
            record_count
        )
    }
}
