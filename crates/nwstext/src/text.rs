//! Text normalization helpers

use lazy_static::lazy_static;
use regex::Regex;

/// Normalize raw bulletin text
///
/// Line endings `\r\r\n`, `\r\n`, and any lone `\r` become `\n`.
/// The control bytes NUL, SOH, and ETX are removed. Other bytes
/// pass through unchanged.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x00' | '\x01' | '\x03' => {}
            '\r' => {
                // swallow any run of carriage returns and one newline
                while chars.peek() == Some(&'\r') {
                    chars.next();
                }
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Collapse every run of whitespace into a single space
///
/// Leading and trailing whitespace is removed.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove trailing dots, commas, and whitespace
pub fn strip_trailing_punctuation(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == '.' || c == ',' || c.is_whitespace())
}

/// Split text into sections on blank lines
///
/// Empty sections are omitted.
pub fn sections(text: &str) -> Vec<&str> {
    lazy_static! {
        static ref BLANK: Regex = Regex::new(r"\n[ \t]*\n").expect("bad section regexp");
    }

    BLANK
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Split text into segments on `$$` delimiter lines
///
/// The delimiter is a line containing only `$$`, optionally
/// surrounded by whitespace. Chunks which are entirely blank are
/// dropped.
pub fn segments(text: &str) -> Vec<&str> {
    lazy_static! {
        static ref DELIM: Regex = Regex::new(r"(?m)^[ \t]*\$\$[ \t]*$").expect("bad segment regexp");
    }

    DELIM
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Minimal HTML escaping for text nodes and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("\x01\r\r\n000 \r\r\nWUUS53 KJAN 291651\r\n\x03"),
            "\n000 \nWUUS53 KJAN 291651\n"
        );
        assert_eq!(normalize("A\rB\x00C"), "A\nBC");
    }

    #[test]
    fn test_collapse_and_strip() {
        assert_eq!(collapse_whitespace("  A \n B\t\tC  "), "A B C");
        assert_eq!(strip_trailing_punctuation("WARNING UNTIL 5 PM..."), "WARNING UNTIL 5 PM");
        assert_eq!(strip_trailing_punctuation("NOTHING"), "NOTHING");
    }

    #[test]
    fn test_segments() {
        let txt = "HEAD\nUGC\n\n$$\n\nSECOND\n  $$  \n\n";
        let segs = segments(txt);
        assert_eq!(segs.len(), 2);
        assert!(segs[0].starts_with("HEAD"));
        assert!(segs[1].contains("SECOND"));

        assert_eq!(segments("NO DELIMITER").len(), 1);
        // a "$$" inside a line does not split
        assert_eq!(segments("COST $$ HIGH\nMORE").len(), 1);
    }

    #[test]
    fn test_sections() {
        let secs = sections("ONE\nLINE\n\nTWO\n  \nTHREE\n\n\n");
        assert_eq!(secs, vec!["ONE\nLINE", "TWO", "THREE"]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & <B>"), "A &amp; &lt;B&gt;");
    }
}
