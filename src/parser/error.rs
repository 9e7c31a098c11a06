//! Error types for bibliography loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a BibTeX database.
///
/// Any of these aborts the run: a bibliography that cannot be read in full
/// would silently skew keyword counts.
#[derive(Debug, Error)]
pub enum BibError {
    /// The bibliography file could not be read.
    #[error("cannot read bibliography '{}': {source}\n  Suggestion: check the path and file permissions", path.display())]
    Io {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be parsed.
    #[error("malformed BibTeX entry `{preview}`: {reason}\n  Suggestion: {suggestion}")]
    MalformedEntry {
        /// Leading text of the offending entry
        preview: String,
        /// Why the entry is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl BibError {
    /// Creates an `Io` error for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a `MalformedEntry` error, truncating the entry text for display.
    #[must_use]
    pub fn malformed(entry: &str, reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::MalformedEntry {
            preview: preview(entry),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a `MalformedEntry` error for unbalanced braces.
    #[must_use]
    pub fn unbalanced(entry: &str) -> Self {
        Self::malformed(
            entry,
            "unbalanced braces (entry never closed)",
            "ensure each '{' has a matching '}'",
        )
    }

    /// Creates a `MalformedEntry` error for a bad field assignment.
    #[must_use]
    pub fn bad_field(entry: &str, reason: impl Into<String>) -> Self {
        Self::malformed(
            entry,
            reason,
            "use `field = {value}` or `field = \"value\"` with commas between fields",
        )
    }
}

fn preview(input: &str) -> String {
    const MAX: usize = 60;
    let flat: String = input
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= MAX {
        return flat;
    }
    let shortened: String = flat.chars().take(MAX).collect();
    format!("{shortened}...")
}
