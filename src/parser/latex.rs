//! LaTeX markup to Unicode conversion for field values.
//!
//! Covers the accent commands and special letters that show up in exported
//! reference lists. Anything unrecognized is left in place, minus grouping
//! braces.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `\'e`, `\'{e}`, `{\'e}`, `\"{\i}` style symbol accents.
#[allow(clippy::expect_used)]
static SYMBOL_ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\\([`'^"~=.])\s*(?:\{\s*\\?([A-Za-z])\s*\}|\\?([A-Za-z]))"#)
        .expect("symbol accent regex is valid")
});

/// `\c{c}`, `\v s`, `\H{o}` style letter accents.
#[allow(clippy::expect_used)]
static LETTER_ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([cvuHrk])(?:\s*\{\s*\\?([A-Za-z])\s*\}|\s+([A-Za-z]))")
        .expect("letter accent regex is valid")
});

#[allow(clippy::expect_used)]
static SPECIAL_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(ss|ae|AE|oe|OE|aa|AA|o|O|l|L|i)\b\s?").expect("special letter regex is valid")
});

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Converts LaTeX accents, special letters, dashes and escapes to Unicode,
/// strips grouping braces and collapses runs of whitespace.
#[must_use]
pub fn latex_to_unicode(input: &str) -> String {
    if !input.contains(['\\', '{', '}', '-', '~']) && !input.contains(char::is_whitespace) {
        return input.to_string();
    }

    let text = SYMBOL_ACCENT.replace_all(input, |caps: &Captures<'_>| {
        let letter = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        accented(&caps[1], letter)
    });
    let text = LETTER_ACCENT.replace_all(&text, |caps: &Captures<'_>| {
        let letter = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        accented(&caps[1], letter)
    });
    let text = SPECIAL_LETTER.replace_all(&text, |caps: &Captures<'_>| {
        match &caps[1] {
            "ss" => "ß",
            "ae" => "æ",
            "AE" => "Æ",
            "oe" => "œ",
            "OE" => "Œ",
            "aa" => "å",
            "AA" => "Å",
            "o" => "ø",
            "O" => "Ø",
            "l" => "ł",
            "L" => "Ł",
            _ => "ı",
        }
        .to_string()
    });

    let text = text
        .replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace("\\&", "&")
        .replace("\\%", "%")
        .replace("\\_", "_")
        .replace("\\$", "$")
        .replace("\\#", "#")
        .replace('~', " ")
        .replace(['{', '}'], "");

    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn accented(accent: &str, letter: &str) -> String {
    let precomposed = match (accent, letter) {
        ("'", "a") => Some('á'),
        ("'", "e") => Some('é'),
        ("'", "i") => Some('í'),
        ("'", "o") => Some('ó'),
        ("'", "u") => Some('ú'),
        ("'", "y") => Some('ý'),
        ("'", "c") => Some('ć'),
        ("'", "n") => Some('ń'),
        ("'", "s") => Some('ś'),
        ("'", "z") => Some('ź'),
        ("'", "A") => Some('Á'),
        ("'", "E") => Some('É'),
        ("'", "I") => Some('Í'),
        ("'", "O") => Some('Ó'),
        ("'", "U") => Some('Ú'),
        ("`", "a") => Some('à'),
        ("`", "e") => Some('è'),
        ("`", "i") => Some('ì'),
        ("`", "o") => Some('ò'),
        ("`", "u") => Some('ù'),
        ("^", "a") => Some('â'),
        ("^", "e") => Some('ê'),
        ("^", "i") => Some('î'),
        ("^", "o") => Some('ô'),
        ("^", "u") => Some('û'),
        ("\"", "a") => Some('ä'),
        ("\"", "e") => Some('ë'),
        ("\"", "i") => Some('ï'),
        ("\"", "o") => Some('ö'),
        ("\"", "u") => Some('ü'),
        ("\"", "A") => Some('Ä'),
        ("\"", "O") => Some('Ö'),
        ("\"", "U") => Some('Ü'),
        ("~", "a") => Some('ã'),
        ("~", "n") => Some('ñ'),
        ("~", "o") => Some('õ'),
        ("~", "N") => Some('Ñ'),
        ("c", "c") => Some('ç'),
        ("c", "C") => Some('Ç'),
        ("c", "s") => Some('ş'),
        ("v", "c") => Some('č'),
        ("v", "s") => Some('š'),
        ("v", "z") => Some('ž'),
        ("v", "r") => Some('ř'),
        ("v", "e") => Some('ě'),
        ("v", "C") => Some('Č'),
        ("v", "S") => Some('Š'),
        ("v", "Z") => Some('Ž'),
        ("H", "o") => Some('ő'),
        ("H", "u") => Some('ű'),
        ("r", "a") => Some('å'),
        ("k", "a") => Some('ą'),
        ("k", "e") => Some('ę'),
        _ => None,
    };
    if let Some(ch) = precomposed {
        return ch.to_string();
    }

    let combining = match accent {
        "'" => '\u{301}',
        "`" => '\u{300}',
        "^" => '\u{302}',
        "\"" => '\u{308}',
        "~" => '\u{303}',
        "=" => '\u{304}',
        "." => '\u{307}',
        "c" => '\u{327}',
        "v" => '\u{30C}',
        "u" => '\u{306}',
        "H" => '\u{30B}',
        "r" => '\u{30A}',
        _ => '\u{328}',
    };
    format!("{letter}{combining}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_accents_all_brace_styles() {
        assert_eq!(latex_to_unicode(r#"Sch\"{o}n"#), "Schön");
        assert_eq!(latex_to_unicode(r#"Sch{\"o}n"#), "Schön");
        assert_eq!(latex_to_unicode(r#"Sch\"on"#), "Schön");
        assert_eq!(latex_to_unicode(r"Jos\'{e}"), "José");
    }

    #[test]
    fn test_dotless_i_inside_accent() {
        assert_eq!(latex_to_unicode(r"Mart\'{\i}nez"), "Martínez");
    }

    #[test]
    fn test_letter_accents() {
        assert_eq!(latex_to_unicode(r"Fran\c{c}ois"), "François");
        assert_eq!(latex_to_unicode(r"\v{S}koda"), "Škoda");
    }

    #[test]
    fn test_special_letters() {
        assert_eq!(latex_to_unicode(r"Stra\ss e"), "Straße");
        assert_eq!(latex_to_unicode(r"S{\o}rensen"), "Sørensen");
    }

    #[test]
    fn test_dashes_and_escapes() {
        assert_eq!(latex_to_unicode("pages 1--10"), "pages 1\u{2013}10");
        assert_eq!(latex_to_unicode(r"R\&D at 50\%"), "R&D at 50%");
    }

    #[test]
    fn test_strips_braces_and_collapses_whitespace() {
        assert_eq!(
            latex_to_unicode("A {Large-Eddy}\n   Simulation of {LES}"),
            "A Large-Eddy Simulation of LES"
        );
    }

    #[test]
    fn test_unknown_pair_uses_combining_mark() {
        assert_eq!(latex_to_unicode(r"\={o}"), "o\u{304}");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(latex_to_unicode("wind farms"), "wind farms");
    }
}
