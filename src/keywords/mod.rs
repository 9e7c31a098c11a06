//! Keyword extraction, alias consolidation and frequency ranking.
//!
//! Records carry a free-text, comma-separated keyword field. This module
//! lowercases and buckets those keywords, collapses synonyms through an
//! [`AliasTable`], and exposes the result as a [`KeywordMap`] plus a
//! frequency-sorted [`FrequencySeries`].

mod aliases;
mod frequency;
mod normalizer;
mod suggest;

pub use aliases::{AliasError, AliasTable};
pub use frequency::FrequencySeries;
pub use normalizer::{KeywordMap, RawKeywordMap, collect_raw_keywords, consolidate};
pub use suggest::{AliasSuggestion, DEFAULT_SIMILARITY_THRESHOLD, suggest_aliases};
