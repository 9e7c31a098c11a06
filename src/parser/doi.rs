//! DOI normalization for BibTeX `doi` fields.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Matches a DOI in bare, `doi:` prefixed, or resolver URL form.
/// Capture group 1 is the bare `10.XXXX/suffix` part.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?://(?:dx\.)?doi\.org/|doi:\s*)?(10\.\d{4,9}(?:\.\d+)*/[^\s<>"'\]]+)"#)
        .expect("DOI regex is valid") // Static pattern, safe to panic
});

/// Normalizes a raw `doi` field value to a bare DOI (`10.XXXX/suffix`).
///
/// Accepts `https://doi.org/...`, `https://dx.doi.org/...`, `doi:...` and bare
/// forms. The suffix is URL-decoded and stripped of trailing punctuation and
/// unmatched closing parentheses. Returns `None` when no valid DOI is present.
///
/// # Examples
///
/// ```
/// use bibkeys_core::parser::normalize_doi;
///
/// assert_eq!(normalize_doi("https://doi.org/10.1234/abc").as_deref(), Some("10.1234/abc"));
/// assert_eq!(normalize_doi("not a doi"), None);
/// ```
#[must_use]
pub fn normalize_doi(value: &str) -> Option<String> {
    let Some(captures) = DOI_PATTERN.captures(value) else {
        debug!(value, "doi field has no recognizable DOI");
        return None;
    };
    let raw = captures.get(1)?.as_str();

    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    };
    let cleaned = clean_trailing(&decoded);

    let (_, suffix) = cleaned.split_once('/')?;
    if suffix.is_empty() {
        debug!(value, "doi field has an empty suffix");
        return None;
    }
    Some(cleaned)
}

fn clean_trailing(doi: &str) -> String {
    let mut result = doi.trim_end_matches(['.', ',', ';', ':', '}']).to_string();

    // DOI suffixes may contain balanced parentheses, e.g. 10.1002/(SICI)1097-4636
    while result.ends_with(')')
        && result.matches(')').count() > result.matches('(').count()
    {
        result.pop();
        result = result.trim_end_matches(['.', ',', ';', ':']).to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_doi_bare() {
        assert_eq!(
            normalize_doi("10.1016/j.renene.2019.01.001").as_deref(),
            Some("10.1016/j.renene.2019.01.001")
        );
    }

    #[test]
    fn test_normalize_doi_url_forms() {
        assert_eq!(
            normalize_doi("https://doi.org/10.1234/example").as_deref(),
            Some("10.1234/example")
        );
        assert_eq!(
            normalize_doi("http://dx.doi.org/10.1234/example").as_deref(),
            Some("10.1234/example")
        );
    }

    #[test]
    fn test_normalize_doi_prefixed() {
        assert_eq!(
            normalize_doi("DOI: 10.1234/example").as_deref(),
            Some("10.1234/example")
        );
    }

    #[test]
    fn test_normalize_doi_strips_trailing_punctuation() {
        assert_eq!(
            normalize_doi("10.1234/example.").as_deref(),
            Some("10.1234/example")
        );
    }

    #[test]
    fn test_normalize_doi_keeps_balanced_parens() {
        assert_eq!(
            normalize_doi("10.1002/(SICI)1097-4636").as_deref(),
            Some("10.1002/(SICI)1097-4636")
        );
        assert_eq!(
            normalize_doi("(10.1234/example)").as_deref(),
            Some("10.1234/example")
        );
    }

    #[test]
    fn test_normalize_doi_url_decodes() {
        assert_eq!(
            normalize_doi("https://doi.org/10.1234/a%3Cb%3E").as_deref(),
            Some("10.1234/a<b>")
        );
    }

    #[test]
    fn test_normalize_doi_rejects_short_registrant() {
        assert_eq!(normalize_doi("10.12/example"), None);
    }

    #[test]
    fn test_normalize_doi_rejects_garbage() {
        assert_eq!(normalize_doi(""), None);
        assert_eq!(normalize_doi("n/a"), None);
    }
}
