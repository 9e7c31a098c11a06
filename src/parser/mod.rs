//! Bibliography loading.
//!
//! Reads a BibTeX database into an ordered sequence of [`Record`]s. Field
//! values have `@string` macros expanded, LaTeX accents converted to Unicode
//! and DOIs normalized to their bare form.
//!
//! # Example
//!
//! ```
//! use bibkeys_core::parser::parse_bibtex;
//!
//! let records = parse_bibtex("@article{k, title={Wakes}, keywords={LES, wakes}}").unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].keywords.as_deref(), Some("LES, wakes"));
//! ```

mod bibtex;
mod doi;
mod error;
mod latex;

pub use bibtex::parse_bibtex;
pub use doi::normalize_doi;
pub use error::BibError;
pub use latex::latex_to_unicode;

use std::path::Path;

use tracing::info;

use crate::record::Record;

/// Reads and parses a BibTeX file.
///
/// # Errors
///
/// Returns [`BibError::Io`] if the file cannot be read and
/// [`BibError::MalformedEntry`] if any entry fails to parse.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_bibliography(path: &Path) -> Result<Vec<Record>, BibError> {
    let content = std::fs::read_to_string(path).map_err(|source| BibError::io(path, source))?;
    let records = parse_bibtex(&content)?;

    let with_keywords = records.iter().filter(|r| r.keywords.is_some()).count();
    info!(
        records = records.len(),
        with_keywords, "Loaded bibliography"
    );
    Ok(records)
}
