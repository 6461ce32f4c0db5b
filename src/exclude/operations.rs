use crate::edn::{find_excludes, find_rule_body, last_closing_brace, quote, ExcludesSpan, RuleSpan};
use crate::exclude::errors::ExcludeError;
use std::fmt;

/// The ways an exclusion can be written into `.splint.edn`, in the order
/// they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Rule has `:excludes [...]`: append the path inside the vector.
    AppendToExcludes { rule: RuleSpan, excludes: ExcludesSpan },
    /// Rule exists without `:excludes`: add the key before the rule's `}`.
    AddExcludesKey { rule: RuleSpan },
    /// Rule missing: add a new entry before the document's final `}`.
    AddRule { closing_brace: usize },
    /// No file, or no closing brace at all: emit a fresh document.
    CreateDocument,
}

/// Replace `[start, end)` of the document with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Strategy {
    /// Pick the strategy for `rule_key` given the current file content.
    pub fn select(content: Option<&str>, rule_key: &str) -> Self {
        let Some(text) = content else {
            return Strategy::CreateDocument;
        };

        if let Some(rule) = find_rule_body(text, rule_key) {
            return match find_excludes(text, &rule) {
                Some(excludes) => Strategy::AppendToExcludes { rule, excludes },
                None => Strategy::AddExcludesKey { rule },
            };
        }

        match last_closing_brace(text) {
            Some(closing_brace) => Strategy::AddRule { closing_brace },
            None => Strategy::CreateDocument,
        }
    }

    /// The span replacement that writes `path` into `text` for `rule_key`.
    pub fn splice(&self, text: &str, rule_key: &str, path: &str) -> Result<Splice, ExcludeError> {
        let literal = quote(path);

        match self {
            Strategy::AppendToExcludes { excludes, .. } => {
                let contents = excludes.contents(text).ok_or_else(|| {
                    ExcludeError::UnterminatedExcludes {
                        rule: rule_key.to_string(),
                    }
                })?;
                let existing = contents.trim_end();
                let separator = if existing.is_empty() { "" } else { " " };
                Ok(Splice {
                    start: excludes.open_bracket + 1 + existing.len(),
                    end: excludes.open_bracket + 1 + contents.len(),
                    text: format!("{separator}{literal}"),
                })
            }
            Strategy::AddExcludesKey { rule } => {
                let body = rule.body(text);
                Ok(Splice {
                    start: rule.open_brace + 1 + body.trim_end().len(),
                    end: rule.close_brace,
                    text: format!(" :excludes [{literal}]"),
                })
            }
            Strategy::AddRule { closing_brace } => {
                let before = text[..*closing_brace].trim_end();
                let tail = &text[closing_brace + 1..];
                // Anything after the final brace other than whitespace (a
                // trailing comment) is kept as-is.
                let tail = if tail.trim().is_empty() { "\n" } else { tail };
                Ok(Splice {
                    start: before.len(),
                    end: text.len(),
                    text: format!("\n {rule_key} {{:excludes [{literal}]}}}}{tail}"),
                })
            }
            Strategy::CreateDocument => Ok(Splice {
                start: 0,
                end: text.len(),
                text: new_document(rule_key, path),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::AppendToExcludes { .. } => "append-to-excludes",
            Strategy::AddExcludesKey { .. } => "add-excludes-key",
            Strategy::AddRule { .. } => "add-rule",
            Strategy::CreateDocument => "create-document",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A minimal document holding a single rule with one exclusion.
pub fn new_document(rule_key: &str, path: &str) -> String {
    format!("{{{rule_key} {{:excludes [{}]}}}}\n", quote(path))
}
