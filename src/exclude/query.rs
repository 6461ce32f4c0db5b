use crate::edn::extract_excludes_strings;

/// Read-only membership checks over one `.splint.edn` snapshot.
///
/// Comparison is exact string equality after unescaping; paths are not
/// normalized, so `glob:**/a.clj` and `**/a.clj` are different entries.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionQuery<'a> {
    content: &'a str,
}

impl<'a> ExclusionQuery<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Exclusions of `rule_key` in document order, duplicates included.
    pub fn excludes(&self, rule_key: &str) -> Vec<String> {
        extract_excludes_strings(self.content, rule_key)
    }

    /// False when the rule, its `:excludes` key, or the path is missing.
    pub fn contains(&self, rule_key: &str, path: &str) -> bool {
        self.excludes(rule_key).iter().any(|entry| entry == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_entry() {
        let query = ExclusionQuery::new(r#"{lint/eq-nil {:excludes ["glob:**/foo.clj"]}}"#);
        assert!(query.contains("lint/eq-nil", "glob:**/foo.clj"));
        assert!(!query.contains("lint/eq-nil", "glob:**/other.clj"));
        assert!(!query.contains("lint/eq-nil", "**/foo.clj"));
    }

    #[test]
    fn missing_rule_or_key_is_false() {
        let query = ExclusionQuery::new(r#"{global {:excludes ["foo"]} lint/eq-nil {:enabled false}}"#);
        assert!(!query.contains("lint/eq-nil", "foo"));
        assert!(!query.contains("lint/missing", "foo"));
        assert!(query.contains("global", "foo"));
    }

    #[test]
    fn compares_after_unescaping() {
        let query = ExclusionQuery::new(r#"{lint/eq-nil {:excludes ["path/with\"quote.clj"]}}"#);
        assert!(query.contains("lint/eq-nil", r#"path/with"quote.clj"#));
    }
}
