//! Minimal structural view of `.splint.edn` text.
//!
//! Only the shape needed for exclusion entries is understood: a top-level map
//! of rule keys to option maps, where an option map may carry an
//! `:excludes [...]` vector of string literals. Nested braces inside a rule
//! body are not supported.

pub mod escape;
pub mod locator;

pub use escape::{escape, quote, unescape};
pub use locator::{
    extract_excludes_strings, find_excludes, find_rule_body, has_excludes_key, last_closing_brace,
    ExcludesSpan, RuleSpan,
};
