//! Bibliographic record model.

use std::fmt;

/// Maximum author characters shown in a listing line.
pub const AUTHOR_DISPLAY_WIDTH: usize = 20;

/// Maximum title characters shown in a listing line.
pub const TITLE_DISPLAY_WIDTH: usize = 55;

/// One bibliography entry, identified by its position in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Stable index into the loaded record sequence.
    pub index: usize,
    /// Entry type (`article`, `book`, ...), lowercased.
    pub entry_type: String,
    /// Citation key after `@type{`.
    pub key: String,
    /// Authors joined with `", "`.
    pub author: Option<String>,
    /// Entry title.
    pub title: Option<String>,
    /// Bare DOI (`10.XXXX/suffix`) when the entry carries a valid one.
    pub doi: Option<String>,
    /// Raw comma-separated keyword string.
    pub keywords: Option<String>,
}

impl Record {
    /// Creates a record with only the identifying fields set.
    #[must_use]
    pub fn new(index: usize, entry_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            index,
            entry_type: entry_type.into(),
            key: key.into(),
            author: None,
            title: None,
            doi: None,
            keywords: None,
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Author string cut to [`AUTHOR_DISPLAY_WIDTH`] characters.
    #[must_use]
    pub fn short_author(&self) -> String {
        truncate_chars(self.author.as_deref().unwrap_or(""), AUTHOR_DISPLAY_WIDTH)
    }

    /// Title cut to [`TITLE_DISPLAY_WIDTH`] characters.
    #[must_use]
    pub fn short_title(&self) -> String {
        truncate_chars(self.title.as_deref().unwrap_or(""), TITLE_DISPLAY_WIDTH)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.short_author(), self.short_title())
    }
}

/// Keeps at most `width` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
