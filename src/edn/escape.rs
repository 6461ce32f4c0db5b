//! String literal escaping shared by `.splint.edn` and splint's JSON output.
//!
//! Both syntaxes only need five escapes: `\\`, `\"`, `\n`, `\r`, `\t`.

/// Encode `input` as the body of a double-quoted literal.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Escape `input` and wrap it in double quotes.
pub fn quote(input: &str) -> String {
    format!("\"{}\"", escape(input))
}

/// Decode the body of a double-quoted literal.
///
/// Single left-to-right pass: an escaped backslash never pairs with the
/// character after it. Unknown escapes and a trailing lone backslash are kept
/// verbatim.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
