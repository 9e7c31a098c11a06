//! Browsable links for featured records.

use url::Url;

use crate::record::Record;

/// Canonical DOI resolver.
pub const DOI_RESOLVER_BASE: &str = "https://doi.org/";

/// Web search used when a record has no DOI.
pub const SEARCH_BASE: &str = "https://lmgtfy.com/?q=";

/// Where featured-record links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Prefix joined with the DOI.
    pub resolver_base: String,
    /// Prefix joined with the `+`-separated, URL-encoded title.
    pub search_base: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            resolver_base: DOI_RESOLVER_BASE.to_string(),
            search_base: SEARCH_BASE.to_string(),
        }
    }
}

/// Builds the link opened for a featured record.
///
/// Records with a DOI resolve through [`LinkConfig::resolver_base`]; others
/// fall back to a search for the title (or the citation key when untitled).
///
/// # Errors
/// Returns a parse error only if a configured base is not a valid URL prefix.
pub fn featured_link(record: &Record, config: &LinkConfig) -> Result<Url, url::ParseError> {
    if let Some(doi) = record.doi.as_deref() {
        let path = doi
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        return Url::parse(&format!("{}{path}", config.resolver_base));
    }

    let query_source = record
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(&record.key);
    Url::parse(&format!("{}{}", config.search_base, search_query(query_source)))
}

/// URL-encodes each word of `text` and joins them with `+`.
#[must_use]
pub fn search_query(text: &str) -> String {
    text.split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
