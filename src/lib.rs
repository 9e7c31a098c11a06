//! Bibliography keyword consolidation and browsing.
//!
//! This library turns a BibTeX bibliography into a consolidated keyword index
//! and the views built on top of it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - BibTeX parsing into [`Record`]s
//! - [`keywords`] - Keyword normalization, alias consolidation and frequencies
//! - [`render`] - Frequency bar chart and weighted word layout
//! - [`selector`] - Click-driven record browsing over a rendered layout

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod keywords;
pub mod parser;
pub mod record;
pub mod render;
pub mod selector;

// Re-export commonly used types
pub use keywords::{AliasError, AliasTable, FrequencySeries, KeywordMap, suggest_aliases};
pub use parser::{BibError, load_bibliography, parse_bibtex};
pub use record::Record;
pub use render::{Color, Palette, RenderConfig, RenderError, WordCloud};
pub use selector::{
    ColorResolver, EventOutcome, LinkOpener, LogOnly, PointerEvent, SelectionMode,
    SelectorSession, SystemBrowser,
};
