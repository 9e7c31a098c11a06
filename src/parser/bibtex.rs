//! BibTeX parsing into [`Record`]s.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::doi::normalize_doi;
use super::error::BibError;
use super::latex::latex_to_unicode;
use crate::record::Record;

#[allow(clippy::expect_used)]
static AUTHOR_SPLIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").expect("bibtex author split regex is valid"));

const IGNORED_BLOCK_TYPES: [&str; 2] = ["comment", "preamble"];
const STRING_BLOCK_TYPE: &str = "string";

const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Parses every entry of a BibTeX database.
///
/// `@comment` and `@preamble` blocks are ignored; `@string` blocks define
/// macros usable by later entries. Every other entry type becomes a
/// [`Record`] indexed in file order.
///
/// # Errors
///
/// Returns [`BibError::MalformedEntry`] for the first entry that cannot be
/// parsed. A partially loaded database is never returned.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_bibtex(input: &str) -> Result<Vec<Record>, BibError> {
    let mut macros: HashMap<String, String> = MONTH_MACROS
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    let mut records = Vec::new();

    for raw_entry in segment_entries(input) {
        match parse_entry(&raw_entry, &macros, records.len())? {
            EntryOutcome::Record(record) => {
                trace!(key = %record.key, index = record.index, "parsed entry");
                records.push(record);
            }
            EntryOutcome::Macros(defined) => {
                for (name, value) in defined {
                    debug!(%name, "defined string macro");
                    macros.insert(name, value);
                }
            }
            EntryOutcome::Ignore => {}
        }
    }

    Ok(records)
}

#[derive(Debug)]
enum EntryOutcome {
    Record(Record),
    Macros(Vec<(String, String)>),
    Ignore,
}

fn segment_entries(input: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut entries = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].1 != '@' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_ascii_alphabetic() {
            j += 1;
        }
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }

        if j >= chars.len() || chars[j].1 != '{' {
            i += 1;
            continue;
        }

        let start = chars[i].0;
        let mut depth = 0usize;
        let mut in_quotes = false;
        let mut escape = false;
        let mut found_end = None;

        for (k, (_, ch)) in chars.iter().enumerate().skip(j) {
            if escape {
                escape = false;
                continue;
            }
            match *ch {
                '\\' => escape = true,
                // Quotes only delimit values at the top level of the entry body
                '"' if depth == 1 => in_quotes = !in_quotes,
                _ if in_quotes => {}
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        found_end = Some(k);
                        break;
                    }
                }
                _ => {}
            }
        }

        if let Some(end_index) = found_end {
            let end_exclusive = chars
                .get(end_index + 1)
                .map_or(input.len(), |(offset, _)| *offset);
            entries.push(input[start..end_exclusive].trim().to_string());
            i = end_index + 1;
        } else {
            // Unbalanced entry: capture up to the next `@` at a line start so
            // the error names the broken entry instead of the whole tail.
            let mut recovery = i + 1;
            while recovery < chars.len() {
                if chars[recovery].1 == '@' && matches!(chars[recovery - 1].1, '\n' | '\r') {
                    break;
                }
                recovery += 1;
            }
            let end_exclusive = chars
                .get(recovery)
                .map_or(input.len(), |(offset, _)| *offset);
            entries.push(input[start..end_exclusive].trim().to_string());
            i = recovery;
        }
    }

    entries
}

fn parse_entry(
    raw_entry: &str,
    macros: &HashMap<String, String>,
    index: usize,
) -> Result<EntryOutcome, BibError> {
    let after_at = raw_entry.trim().trim_start_matches('@');
    let Some(brace_pos) = after_at.find('{') else {
        return Err(BibError::malformed(
            raw_entry,
            "missing opening '{' after entry type",
            "use `@type{key, field = value}`",
        ));
    };

    let entry_type = after_at[..brace_pos].trim().to_ascii_lowercase();
    if IGNORED_BLOCK_TYPES.contains(&entry_type.as_str()) {
        return Ok(EntryOutcome::Ignore);
    }
    if !after_at.ends_with('}') {
        return Err(BibError::unbalanced(raw_entry));
    }
    let body = &after_at[brace_pos + 1..after_at.len() - 1];

    if entry_type == STRING_BLOCK_TYPE {
        let pairs = parse_fields(body).map_err(|reason| BibError::bad_field(raw_entry, reason))?;
        let defined = pairs
            .into_iter()
            .map(|(name, value)| (name, resolve_value(&value, macros)))
            .collect();
        return Ok(EntryOutcome::Macros(defined));
    }

    let (key_raw, fields_raw) = body.split_once(',').unwrap_or((body, ""));
    let key = key_raw.trim();
    if key.is_empty() {
        return Err(BibError::malformed(
            raw_entry,
            "empty citation key",
            "provide a non-empty key before the first comma",
        ));
    }

    let pairs = parse_fields(fields_raw).map_err(|reason| BibError::bad_field(raw_entry, reason))?;
    let mut fields: HashMap<String, String> = HashMap::new();
    for (name, value) in pairs {
        // First-value-wins per standard BibTeX convention.
        fields
            .entry(name)
            .or_insert_with(|| resolve_value(&value, macros));
    }

    let mut record = Record::new(index, entry_type, key);
    record.title = fields
        .get("title")
        .map(|value| latex_to_unicode(value))
        .filter(|value| !value.is_empty());
    record.author = fields
        .get("author")
        .map(|value| normalize_authors(&latex_to_unicode(value)))
        .filter(|value| !value.is_empty());
    record.doi = fields.get("doi").and_then(|value| normalize_doi(value));
    record.keywords = fields
        .get("keywords")
        .map(|value| latex_to_unicode(value))
        .filter(|value| !value.is_empty());

    Ok(EntryOutcome::Record(record))
}

/// Splits a field list into `(lowercased name, raw value)` pairs.
fn parse_fields(input: &str) -> Result<Vec<(String, String)>, String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }
        if ch == '\\' {
            current.push(ch);
            escape = true;
            continue;
        }
        if ch == '"' && depth == 0 {
            in_quotes = !in_quotes;
            current.push(ch);
            continue;
        }
        if !in_quotes {
            if ch == '{' {
                depth += 1;
            } else if ch == '}' {
                if depth == 0 {
                    return Err("closing brace without matching opening brace".to_string());
                }
                depth -= 1;
            } else if ch == ',' && depth == 0 {
                let segment = current.trim();
                if !segment.is_empty() {
                    segments.push(segment.to_string());
                }
                current.clear();
                continue;
            }
        }
        current.push(ch);
    }

    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    if depth != 0 {
        return Err("unbalanced braces in field values".to_string());
    }

    let tail = current.trim();
    if !tail.is_empty() {
        segments.push(tail.to_string());
    }

    let mut pairs = Vec::with_capacity(segments.len());
    for segment in segments {
        let Some((name, value_raw)) = segment.split_once('=') else {
            return Err(format!("missing '=' in field segment `{segment}`"));
        };
        let field_name = name.trim().to_ascii_lowercase();
        if field_name.is_empty() {
            return Err("empty field name".to_string());
        }
        let value = value_raw.trim();
        if value.is_empty() {
            return Err(format!("empty value in field `{field_name}`"));
        }
        pairs.push((field_name, value.to_string()));
    }

    Ok(pairs)
}

/// Resolves `#` concatenation, delimiters and macro references of a raw value.
fn resolve_value(raw: &str, macros: &HashMap<String, String>) -> String {
    split_concatenation(raw)
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            if piece.len() >= 2
                && ((piece.starts_with('{') && piece.ends_with('}'))
                    || (piece.starts_with('"') && piece.ends_with('"')))
            {
                return piece[1..piece.len() - 1].to_string();
            }
            macros
                .get(&piece.to_ascii_lowercase())
                .cloned()
                .unwrap_or_else(|| piece.to_string())
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn split_concatenation(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;
    let mut start = 0usize;

    for (offset, ch) in raw.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' if depth == 0 => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => depth = depth.saturating_sub(1),
            '#' if depth == 0 && !in_quotes => {
                pieces.push(&raw[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    pieces.push(&raw[start..]);
    pieces
}

fn normalize_authors(value: &str) -> String {
    AUTHOR_SPLIT_PATTERN
        .split(value)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_parse_bibtex_accepts_any_entry_type() {
        let input = r"
@article{a1, title={A}, author={Smith, J.}}
@book{b1, title={B}, author={Jones, K.}}
@phdthesis{c1, title={C}, author={Lee, M.}}
@misc{d1, title={D}}
";
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].entry_type, "phdthesis");
        let indices: Vec<_> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_bibtex_extracts_fields() {
        let input = r"@article{k,
  title = {Paper Title},
  author = {Smith, J. and Doe, R.},
  doi = {https://doi.org/10.1234/example},
  keywords = {LES, wind farms}
}";
        let records = parse_bibtex(input).unwrap();
        let record = &records[0];
        assert_eq!(record.key, "k");
        assert_eq!(record.title.as_deref(), Some("Paper Title"));
        assert_eq!(record.author.as_deref(), Some("Smith, J., Doe, R."));
        assert_eq!(record.doi.as_deref(), Some("10.1234/example"));
        assert_eq!(record.keywords.as_deref(), Some("LES, wind farms"));
    }

    #[test]
    fn test_parse_bibtex_missing_keywords_is_none() {
        let records = parse_bibtex("@article{k, title={A}}").unwrap();
        assert!(records[0].keywords.is_none());
        assert!(records[0].doi.is_none());
    }

    #[test]
    fn test_parse_bibtex_quoted_values() {
        let input = r#"@article{k, title="Quoted {Title}", author="Smith, J.",}"#;
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("Quoted Title"));
    }

    #[test]
    fn test_parse_bibtex_latex_in_title_and_author() {
        let input = r#"@article{k, title={Wake {\"o}bservations --- a review}, author={Port\'{e}-Agel, F.}}"#;
        let records = parse_bibtex(input).unwrap();
        assert_eq!(
            records[0].title.as_deref(),
            Some("Wake öbservations \u{2014} a review")
        );
        assert_eq!(records[0].author.as_deref(), Some("Porté-Agel, F."));
    }

    #[test]
    fn test_parse_bibtex_umlauts_in_author_and_keywords() {
        let input = r#"
@article{a, author={M{\"u}ller, A.}, keywords={Str{\"o}mung}}
@article{b, author="M{\"u}ller, B.", keywords={Str\"{o}mung, wakes}}
"#;
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records[0].author.as_deref(), Some("Müller, A."));
        assert_eq!(records[1].author.as_deref(), Some("Müller, B."));
        assert_eq!(records[0].keywords.as_deref(), Some("Strömung"));
        assert_eq!(records[1].keywords.as_deref(), Some("Strömung, wakes"));
    }

    #[test]
    fn test_parse_bibtex_ignores_comment_and_preamble() {
        let input = r#"
@comment{this is ignored}
@preamble{"\newcommand{\noop}{}"}
@article{k, title={A}}
"#;
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 0);
    }

    #[test]
    fn test_parse_bibtex_string_macros_and_concatenation() {
        let input = r#"
@string{jwe = "J. Wind Eng."}
@article{k, title={A}, journal = jwe, note = "Published " # jun # " 2019"}
@article{k2, title = jwe # { Special}}
"#;
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title.as_deref(), Some("J. Wind Eng. Special"));
    }

    #[test]
    fn test_parse_bibtex_month_macro() {
        let input = r"@article{k, title = {Issue } # dec}";
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("Issue December"));
    }

    #[test]
    fn test_parse_bibtex_bare_values() {
        let input = r"@article{k, title = Bare, year = 2024}";
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("Bare"));
    }

    #[test]
    fn test_parse_bibtex_duplicate_field_first_value_wins() {
        let input = r"@article{k, title={First Title}, title={Second Title}}";
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("First Title"));
    }

    #[test]
    fn test_parse_bibtex_key_only_entry() {
        let records = parse_bibtex("@misc{lonely}").unwrap();
        assert_eq!(records[0].key, "lonely");
        assert!(records[0].title.is_none());
    }

    #[test]
    fn test_parse_bibtex_unbalanced_entry_is_fatal() {
        let input = r"
@article{bad, title={Broken}
@article{ok, title={Good}}
";
        let err = parse_bibtex(input).unwrap_err();
        assert!(err.to_string().contains("unbalanced braces"));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_parse_bibtex_missing_equals_is_fatal() {
        let err = parse_bibtex(r"@article{bad, title {Missing equals}}").unwrap_err();
        assert!(err.to_string().contains("missing '='"));
    }

    #[test]
    fn test_parse_bibtex_empty_key_is_fatal() {
        let err = parse_bibtex(r"@article{, title={A}}").unwrap_err();
        assert!(err.to_string().contains("empty citation key"));
    }

    #[test]
    fn test_parse_bibtex_ignores_stray_at_signs() {
        let input = "contact: someone@example.org\n@article{k, title={A}}";
        let records = parse_bibtex(input).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_bibtex_empty_input() {
        assert!(parse_bibtex("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bibtex_large_batch_500_entries() {
        let mut input = String::new();
        for idx in 0..500 {
            input.push_str(&format!(
                "@article{{k{idx}, title={{Title {idx}}}, author={{Smith, J. and Doe, R.}}, keywords={{les, wakes}}, doi={{10.1234/test-{idx}}}}}\n"
            ));
        }

        let start = Instant::now();
        let records = parse_bibtex(&input).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(records.len(), 500);
        assert_eq!(records[499].doi.as_deref(), Some("10.1234/test-499"));
        eprintln!("Parsed 500 BibTeX entries in {elapsed:?}");
    }
}
