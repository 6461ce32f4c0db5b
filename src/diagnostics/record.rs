use std::fmt;

/// Message used when a record carries none.
pub const DEFAULT_MESSAGE: &str = "generic issue";
/// Level used when a record carries none.
pub const DEFAULT_LEVEL: &str = "warning";

/// One issue reported by splint.
///
/// Coordinates are 1-based as reported. `end_line`/`end_column` only take
/// effect when both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
    pub message: String,
    pub level: String,
    pub rule_name: Option<String>,
    /// Suggested literal replacement for the flagged range
    pub alt: Option<String>,
}

impl DiagnosticRecord {
    /// Record at `line` with every other field defaulted.
    pub fn new(line: u32) -> Self {
        Self {
            line,
            column: 1,
            end_line: None,
            end_column: None,
            message: DEFAULT_MESSAGE.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            rule_name: None,
            alt: None,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_level(&self.level)
    }

    /// `message [rule-name]`, or just the message when no rule is named.
    pub fn rendered_message(&self) -> String {
        match &self.rule_name {
            Some(rule) => format!("{} [{}]", self.message, rule),
            None => self.message.clone(),
        }
    }
}

/// Severity handed to the annotation renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl Severity {
    /// `"error"` and `"info"` (any case) map to themselves, everything else
    /// is a warning.
    pub fn from_level(level: &str) -> Self {
        if level.eq_ignore_ascii_case("error") {
            Severity::Error
        } else if level.eq_ignore_ascii_case("info") {
            Severity::Information
        } else {
            Severity::Warning
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
        }
    }
}
