//! Lenient decoding of splint's `--output json` stream.
//!
//! splint prints one JSON object per line, possibly interleaved with other
//! output. Each line is decoded on its own: well-formed JSON goes through
//! serde, anything else falls back to key-scoped patterns for the handful
//! of fields we care about. A line that still cannot be placed is dropped
//! and decoding carries on with the next one.

use crate::diagnostics::record::{DiagnosticRecord, DEFAULT_LEVEL, DEFAULT_MESSAGE};
use crate::edn::unescape;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Why a candidate line produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("line does not start with '{{'")]
    NotARecord,

    #[error("record has no line number")]
    MissingLine,
}

/// The fields we read; everything else on the line is ignored.
#[derive(Debug, Default, Deserialize)]
struct RawFields {
    line: Option<u32>,
    column: Option<u32>,
    #[serde(rename = "end-line")]
    end_line: Option<u32>,
    #[serde(rename = "end-column")]
    end_column: Option<u32>,
    message: Option<String>,
    level: Option<String>,
    #[serde(rename = "rule-name")]
    rule_name: Option<String>,
    alt: Option<String>,
}

impl RawFields {
    fn into_record(self) -> Result<DiagnosticRecord, SkipReason> {
        // Line 0 is kept; placement clamps it onto the first line.
        let line = self.line.ok_or(SkipReason::MissingLine)?;

        Ok(DiagnosticRecord {
            line,
            column: self.column.unwrap_or(1),
            end_line: self.end_line,
            end_column: self.end_column,
            message: self.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            level: self.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            rule_name: self.rule_name,
            alt: self.alt,
        })
    }
}

struct FieldPatterns {
    line: Regex,
    column: Regex,
    end_line: Regex,
    end_column: Regex,
    message: Regex,
    level: Regex,
    rule_name: Regex,
    alt: Regex,
}

fn int_field(key: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*:\s*(\d+)"#, regex::escape(key))).expect("valid int pattern")
}

fn string_field(key: &str) -> Regex {
    Regex::new(&format!(
        r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#,
        regex::escape(key)
    ))
    .expect("valid string pattern")
}

static PATTERNS: Lazy<FieldPatterns> = Lazy::new(|| FieldPatterns {
    line: int_field("line"),
    column: int_field("column"),
    end_line: int_field("end-line"),
    end_column: int_field("end-column"),
    message: string_field("message"),
    level: string_field("level"),
    rule_name: string_field("rule-name"),
    alt: string_field("alt"),
});

/// First decimal run after `"key":`. Runs that overflow count as absent.
fn find_int(pattern: &Regex, line: &str) -> Option<u32> {
    pattern.captures(line)?.get(1)?.as_str().parse().ok()
}

fn find_string(pattern: &Regex, line: &str) -> Option<String> {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|raw| unescape(raw.as_str()))
}

fn scan_fields(line: &str) -> RawFields {
    let patterns = &*PATTERNS;
    RawFields {
        line: find_int(&patterns.line, line),
        column: find_int(&patterns.column, line),
        end_line: find_int(&patterns.end_line, line),
        end_column: find_int(&patterns.end_column, line),
        message: find_string(&patterns.message, line),
        level: find_string(&patterns.level, line),
        rule_name: find_string(&patterns.rule_name, line),
        alt: find_string(&patterns.alt, line),
    }
}

/// Decode one line of tool output.
pub fn decode_line(line: &str) -> Result<DiagnosticRecord, SkipReason> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return Err(SkipReason::NotARecord);
    }

    let fields = match serde_json::from_str::<RawFields>(trimmed) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::debug!(error = %err, "not strict JSON, scanning fields");
            scan_fields(trimmed)
        }
    };

    fields.into_record()
}

/// Decode every record in `raw`, in input order.
///
/// Never fails: lines that are not records, or records that cannot be
/// placed, are skipped.
pub fn decode(raw: &str) -> Vec<DiagnosticRecord> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.lines()
        .enumerate()
        .filter_map(|(idx, line)| match decode_line(line) {
            Ok(record) => Some(record),
            Err(SkipReason::NotARecord) => None,
            Err(reason) => {
                tracing::debug!(line = idx + 1, %reason, "dropping diagnostic");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLINT_LINE: &str = r#"{"alt":"\"w-1/3 text-right mt-1 pr-1\"","column":28,"end-column":62,"end-line":132,"exception":null,"filename":"src/main/my_app/screen.cljs","form":"(str \"w-1/3 text-right mt-1 pr-1\")","line":132,"message":"Use the literal directly.","rule-name":"lint/redundant-str-call"}"#;

    #[test]
    fn decodes_strict_json() {
        let record = decode_line(SPLINT_LINE).unwrap();
        assert_eq!(record.line, 132);
        assert_eq!(record.column, 28);
        assert_eq!(record.end_line, Some(132));
        assert_eq!(record.end_column, Some(62));
        assert_eq!(record.message, "Use the literal directly.");
        assert_eq!(record.level, "warning");
        assert_eq!(record.rule_name.as_deref(), Some("lint/redundant-str-call"));
        assert_eq!(record.alt.as_deref(), Some("\"w-1/3 text-right mt-1 pr-1\""));
    }

    #[test]
    fn falls_back_on_loose_json() {
        // Trailing comma and an unquoted symbol: not valid JSON.
        let line = r#"{"line": 7, "column": 3, "message": "say \"hi\"", level: warn, "rule-name": "style/x",}"#;
        let record = decode_line(line).unwrap();
        assert_eq!(record.line, 7);
        assert_eq!(record.column, 3);
        assert_eq!(record.message, "say \"hi\"");
        assert_eq!(record.level, "warning");
        assert_eq!(record.rule_name.as_deref(), Some("style/x"));
    }

    #[test]
    fn wrong_typed_field_falls_back_to_scan() {
        let line = r#"{"line": 4, "column": "x", "message": "m"}"#;
        let record = decode_line(line).unwrap();
        assert_eq!(record.line, 4);
        assert_eq!(record.column, 1);
        assert_eq!(record.message, "m");
    }

    #[test]
    fn end_line_does_not_shadow_line() {
        let line = r#"{"end-line": 9, "message": "m"}"#;
        assert_eq!(decode_line(line), Err(SkipReason::MissingLine));
    }

    #[test]
    fn skips_non_records_and_unplaceable_lines() {
        assert_eq!(decode_line("Linting 3 files"), Err(SkipReason::NotARecord));
        assert_eq!(decode_line(r#"{"message": "m"}"#), Err(SkipReason::MissingLine));
    }

    #[test]
    fn line_zero_is_kept_and_clamped() {
        use crate::diagnostics::range::{map_range, TextDocument, TextRange};

        let records = decode(r#"{"line": 0, "column": 2, "message": "m"}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 0);

        let doc = TextDocument::new("abc\ndef");
        assert_eq!(map_range(&doc, &records[0]), TextRange::new(1, 2));
    }

    #[test]
    fn decode_keeps_order_and_skips_noise() {
        let raw = format!("\n  {SPLINT_LINE}\nsplint done\n{{\"line\": 2}}\n{{broken\n");
        let records = decode(&raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 132);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[1].message, "generic issue");
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(decode("").is_empty());
        assert!(decode("  \n\t\n").is_empty());
    }
}
