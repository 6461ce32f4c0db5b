use crate::edn::escape::unescape;

const EXCLUDES_KEY: &str = ":excludes";

/// Byte offsets of a rule entry `key { ... }`.
///
/// `close_brace` is the first `}` after `open_brace` that is not inside a
/// string literal or comment. Nested maps inside a rule body are not
/// supported and end the body early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpan {
    pub key_start: usize,
    pub key_end: usize,
    pub open_brace: usize,
    pub close_brace: usize,
}

impl RuleSpan {
    /// Text between the braces, exclusive.
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.open_brace + 1..self.close_brace]
    }
}

/// Byte offsets of an `:excludes [ ... ]` option inside a rule body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludesSpan {
    pub key_start: usize,
    pub open_bracket: usize,
    /// `None` when the vector is not closed before the rule body ends.
    pub close_bracket: Option<usize>,
}

impl ExcludesSpan {
    /// Raw text between the brackets, when the vector is closed.
    pub fn contents<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.close_bracket
            .map(|close| &text[self.open_bracket + 1..close])
    }
}

/// Find the first rule entry keyed by `rule_key`.
///
/// The key must start at the beginning of the text or after whitespace, a
/// comma or `{`, and be followed (after optional whitespace) by `{`. Keys
/// inside string literals and `;` comments are ignored.
pub fn find_rule_body(text: &str, rule_key: &str) -> Option<RuleSpan> {
    if rule_key.is_empty() {
        return None;
    }

    for (key_start, _) in Structural::new(text, 0, text.len()) {
        if !text[key_start..].starts_with(rule_key) || !key_boundary_before(text, key_start) {
            continue;
        }

        let key_end = key_start + rule_key.len();
        let open_brace = skip_whitespace(text, key_end, text.len());
        if !text[open_brace..].starts_with('{') {
            continue;
        }

        let close_brace = Structural::new(text, open_brace + 1, text.len())
            .find(|&(_, ch)| ch == '}')
            .map(|(idx, _)| idx)?;

        return Some(RuleSpan {
            key_start,
            key_end,
            open_brace,
            close_brace,
        });
    }

    None
}

/// Find the `:excludes [` option inside a located rule body.
pub fn find_excludes(text: &str, rule: &RuleSpan) -> Option<ExcludesSpan> {
    let body_start = rule.open_brace + 1;
    let body_end = rule.close_brace;

    for (key_start, _) in Structural::new(text, body_start, body_end) {
        if !text[key_start..body_end].starts_with(EXCLUDES_KEY) {
            continue;
        }

        let after_key = key_start + EXCLUDES_KEY.len();
        let open_bracket = skip_whitespace(text, after_key, body_end);
        if !text[open_bracket..body_end].starts_with('[') {
            continue;
        }

        let close_bracket = Structural::new(text, open_bracket + 1, body_end)
            .find(|&(_, ch)| ch == ']')
            .map(|(idx, _)| idx);

        return Some(ExcludesSpan {
            key_start,
            open_bracket,
            close_bracket,
        });
    }

    None
}

/// True iff the rule exists and its body has `:excludes` followed by `[`.
pub fn has_excludes_key(text: &str, rule_key: &str) -> bool {
    find_rule_body(text, rule_key)
        .and_then(|rule| find_excludes(text, &rule))
        .is_some()
}

/// Unescaped string literals of the rule's excludes vector, in document order.
///
/// Returns an empty list when the rule, the key or the closing bracket is
/// missing. Duplicates are kept.
pub fn extract_excludes_strings(text: &str, rule_key: &str) -> Vec<String> {
    let Some(rule) = find_rule_body(text, rule_key) else {
        return Vec::new();
    };
    let Some(contents) = find_excludes(text, &rule).and_then(|span| span.contents(text)) else {
        return Vec::new();
    };

    string_literals(contents)
        .into_iter()
        .map(unescape)
        .collect()
}

/// Offset of the last `}` outside string literals and comments.
pub fn last_closing_brace(text: &str) -> Option<usize> {
    Structural::new(text, 0, text.len())
        .filter(|&(_, ch)| ch == '}')
        .last()
        .map(|(idx, _)| idx)
}

/// Raw bodies of every double-quoted literal in `text`.
fn string_literals(text: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('"') {
        let body_start = pos + rel + 1;
        match string_end(text, body_start, text.len()) {
            Some(close) => {
                literals.push(&text[body_start..close]);
                pos = close + 1;
            }
            None => break,
        }
    }

    literals
}

fn key_boundary_before(text: &str, idx: usize) -> bool {
    match text[..idx].chars().next_back() {
        None => true,
        Some(ch) => ch.is_whitespace() || ch == ',' || ch == '{',
    }
}

fn skip_whitespace(text: &str, from: usize, end: usize) -> usize {
    let trimmed = text[from..end].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    end - trimmed.len()
}

/// Index of the quote closing a literal whose body starts at `from`.
fn string_end(text: &str, from: usize, end: usize) -> Option<usize> {
    let mut escape = false;
    for (idx, ch) in text[from..end].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => return Some(from + idx),
            _ => {}
        }
    }
    None
}

/// Characters of `text[start..end]` that sit outside string literals and
/// `;` line comments.
struct Structural<'a> {
    text: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Structural<'a> {
    fn new(text: &'a str, start: usize, end: usize) -> Self {
        Self {
            text,
            pos: start,
            end,
        }
    }
}

impl Iterator for Structural<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.end {
            let ch = self.text[self.pos..self.end].chars().next()?;
            let at = self.pos;
            self.pos += ch.len_utf8();

            match ch {
                '"' => {
                    self.pos = string_end(self.text, self.pos, self.end)
                        .map_or(self.end, |close| close + 1);
                }
                ';' => {
                    self.pos = self.text[self.pos..self.end]
                        .find('\n')
                        .map_or(self.end, |rel| self.pos + rel + 1);
                }
                _ => return Some((at, ch)),
            }
        }
        None
    }
}
