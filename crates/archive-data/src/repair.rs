//! Repair of byte-wise `\u00XX` escape runs.
//!
//! Some exports write each byte of a UTF-8 encoded character as its own
//! `\u00XX` escape, so `é` arrives as `\u00c3\u00a9` instead of `\u00e9`.
//! [`repair_escapes`] rewrites every maximal run of such escapes into the
//! text its bytes decode to, before the document is handed to the JSON
//! parser.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// Length of one `\u00XX` unit.
const UNIT_LEN: usize = 6;

/// Result of one repair pass over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedText {
    /// Document text with every escape run rewritten.
    pub text: String,
    /// Runs that decoded to valid UTF-8.
    pub runs_repaired: usize,
    /// Runs that were not valid UTF-8 and were dropped.
    pub decode_failures: usize,
}

fn escape_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:\\u00[0-9a-f]{2})+").expect("regex is valid"))
}

/// Rewrite every `\u00XX` escape run in `raw` as the UTF-8 text it encodes.
///
/// A run that does not decode is replaced with nothing and counted in
/// [`RepairedText::decode_failures`]. Decoded text is re-escaped as JSON
/// string content, so a run that decodes to `"` or a control character
/// still yields a valid document.
pub fn repair_escapes(raw: &str) -> RepairedText {
    let mut text = String::with_capacity(raw.len());
    let mut runs_repaired = 0;
    let mut decode_failures = 0;
    let mut last = 0;

    for m in escape_run_regex().find_iter(raw) {
        text.push_str(&raw[last..m.start()]);
        last = m.end();

        let mut run = m.as_str();
        if ends_with_odd_backslashes(&raw[..m.start()]) {
            // `\\u00XX`: the backslash is escaped, so the first unit is literal.
            text.push_str(&run[..UNIT_LEN]);
            run = &run[UNIT_LEN..];
        }
        if run.is_empty() {
            continue;
        }

        match decode_run(run) {
            Some(decoded) => {
                push_json_escaped(&mut text, &decoded);
                runs_repaired += 1;
            }
            None => {
                warn!("Failed to decode escape run \"{}\"", run);
                decode_failures += 1;
            }
        }
    }
    text.push_str(&raw[last..]);

    RepairedText {
        text,
        runs_repaired,
        decode_failures,
    }
}

/// Decode a run of `\u00XX` units as one UTF-8 byte sequence.
///
/// Returns `None` when the bytes are not valid UTF-8.
pub fn decode_run(run: &str) -> Option<String> {
    let bytes = run
        .as_bytes()
        .chunks(UNIT_LEN)
        .map(|unit| {
            let hex = std::str::from_utf8(unit.get(4..UNIT_LEN)?).ok()?;
            u8::from_str_radix(hex, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

fn ends_with_odd_backslashes(prefix: &str) -> bool {
    prefix.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

fn push_json_escaped(out: &mut String, decoded: &str) {
    for c in decoded.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_byte_character() {
        let repaired = repair_escapes(r#"{"content": "caf\u00c3\u00a9"}"#);
        assert_eq!(repaired.text, r#"{"content": "café"}"#);
        assert_eq!(repaired.runs_repaired, 1);
        assert_eq!(repaired.decode_failures, 0);
    }

    #[test]
    fn test_four_byte_emoji() {
        let repaired = repair_escapes(r#""\u00f0\u009f\u0098\u0080""#);
        assert_eq!(repaired.text, "\"😀\"");
    }

    #[test]
    fn test_uppercase_hex_is_accepted() {
        let repaired = repair_escapes(r#""\u00C5\u0082\U00C3\u00B3""#);
        assert_eq!(repaired.text, "\"łó\"");
    }

    #[test]
    fn test_separate_runs_decode_independently() {
        let repaired = repair_escapes(r#""\u00c5\u0082a\u00c3\u00b3""#);
        assert_eq!(repaired.text, "\"łaó\"");
        assert_eq!(repaired.runs_repaired, 2);
    }

    #[test]
    fn test_invalid_run_becomes_empty() {
        let repaired = repair_escapes(r#""ok \u00ff\u00fe end""#);
        assert_eq!(repaired.text, "\"ok  end\"");
        assert_eq!(repaired.runs_repaired, 0);
        assert_eq!(repaired.decode_failures, 1);
    }

    #[test]
    fn test_truncated_sequence_becomes_empty() {
        // First two bytes of a three-byte character only.
        let repaired = repair_escapes(r#""\u00e2\u0080""#);
        assert_eq!(repaired.text, "\"\"");
        assert_eq!(repaired.decode_failures, 1);
    }

    #[test]
    fn test_text_without_escapes_is_unchanged() {
        let raw = r#"{"messages": [{"content": "plain \n text"}]}"#;
        let repaired = repair_escapes(raw);
        assert_eq!(repaired.text, raw);
        assert_eq!(repaired.runs_repaired, 0);
    }

    #[test]
    fn test_escaped_backslash_is_literal() {
        let raw = r#""C:\\u00e9dition""#;
        let repaired = repair_escapes(raw);
        assert_eq!(repaired.text, raw);
        assert_eq!(repaired.decode_failures, 0);
    }

    #[test]
    fn test_escaped_backslash_only_protects_first_unit() {
        let repaired = repair_escapes(r#""\\u0041\u00c3\u00a9""#);
        assert_eq!(repaired.text, r#""\\u0041é""#);
        assert_eq!(repaired.runs_repaired, 1);
    }

    #[test]
    fn test_decoded_quote_and_newline_are_reescaped() {
        let repaired = repair_escapes(r#""say \u0022hi\u0022\u000a""#);
        assert_eq!(repaired.text, r#""say \"hi\"\u000a""#);
        let parsed: String = serde_json::from_str(&repaired.text).unwrap();
        assert_eq!(parsed, "say \"hi\"\n");
    }

    #[test]
    fn test_decode_run_direct() {
        assert_eq!(decode_run(r"\u00c3\u00a9").as_deref(), Some("é"));
        assert_eq!(decode_run(r"\u0041").as_deref(), Some("A"));
        assert!(decode_run(r"\u00c3").is_none());
    }
}
