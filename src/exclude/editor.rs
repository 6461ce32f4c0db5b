use crate::edit::{write_atomic, Edit, EditError, EditResult};
use crate::exclude::errors::ExcludeError;
use crate::exclude::operations::Strategy;
use std::path::PathBuf;

/// A computed, not yet persisted, exclusion patch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ExclusionPlan does nothing until applied"]
pub struct ExclusionPlan {
    pub strategy: Strategy,
    pub file: PathBuf,
    /// `None` when the config file does not exist yet
    pub before: Option<String>,
    pub after: String,
    edit: Option<Edit>,
}

impl ExclusionPlan {
    /// Whether applying throws away existing content that had no
    /// closing brace. A blank file is not counted.
    pub fn replaces_malformed(&self) -> bool {
        self.strategy == Strategy::CreateDocument
            && self
                .before
                .as_deref()
                .is_some_and(|before| !before.trim().is_empty())
    }

    /// Persist the new text. Returns `false` when the file already held it.
    ///
    /// Existing files are rewritten through a verified [`Edit`], so a file
    /// that changed since it was read is left untouched. A missing file is
    /// created whole.
    pub fn apply(&self) -> Result<bool, ExcludeError> {
        match &self.edit {
            Some(edit) => match edit.apply()? {
                EditResult::Applied { .. } => {}
                EditResult::AlreadyApplied { .. } => {
                    tracing::debug!(
                        file = %self.file.display(),
                        "config already holds the exclusion"
                    );
                    return Ok(false);
                }
            },
            None => write_atomic(&self.file, self.after.as_bytes()).map_err(|err| match err {
                EditError::Io(source) => ExcludeError::Io {
                    path: self.file.clone(),
                    source,
                },
                other => ExcludeError::Edit(other),
            })?,
        }
        tracing::debug!(
            file = %self.file.display(),
            strategy = %self.strategy,
            "exclusion written"
        );
        Ok(true)
    }
}

/// Plans exclusion patches against one `.splint.edn` snapshot.
pub struct ExclusionEditor {
    file: PathBuf,
    content: Option<String>,
}

impl ExclusionEditor {
    /// Editor over an in-memory buffer.
    pub fn parse(content: &str) -> Self {
        Self::from_path("<splint-edn-buffer>", Some(content))
    }

    /// `content` is `None` when `path` does not exist.
    pub fn from_path(path: impl Into<PathBuf>, content: Option<&str>) -> Self {
        Self {
            file: path.into(),
            content: content.map(str::to_string),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Compute the text that adds `path` to `rule_key`'s exclusions.
    ///
    /// Paths are appended even when already present.
    pub fn plan(&self, rule_key: &str, path: &str) -> Result<ExclusionPlan, ExcludeError> {
        validate_rule_key(rule_key)?;

        let strategy = Strategy::select(self.content(), rule_key);
        let current = self.content().unwrap_or_default();
        let splice = strategy.splice(current, rule_key, path)?;

        let edit = self.content.as_ref().map(|content| {
            Edit::new(
                self.file.clone(),
                splice.start,
                splice.end,
                splice.text.clone(),
                &content[splice.start..splice.end],
            )
        });

        let mut after = String::with_capacity(current.len() + splice.text.len());
        after.push_str(&current[..splice.start]);
        after.push_str(&splice.text);
        after.push_str(&current[splice.end..]);

        tracing::debug!(rule = rule_key, strategy = %strategy, "planned exclusion");

        Ok(ExclusionPlan {
            strategy,
            file: self.file.clone(),
            before: self.content.clone(),
            after,
            edit,
        })
    }
}

/// Rule keys are bare symbols such as `performance` or `lint/eq-nil`.
fn validate_rule_key(rule_key: &str) -> Result<(), ExcludeError> {
    let invalid = |message: &str| ExcludeError::InvalidRuleKey {
        key: rule_key.to_string(),
        message: message.to_string(),
    };

    if rule_key.is_empty() {
        return Err(invalid("empty rule key"));
    }
    if let Some(ch) = rule_key
        .chars()
        .find(|ch| ch.is_whitespace() || matches!(ch, '{' | '}' | '[' | ']' | '"' | ';' | ','))
    {
        return Err(invalid(&format!("unexpected character {ch:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_without_file_creates_document() {
        let editor = ExclusionEditor::from_path("/nowhere/.splint.edn", None);
        let plan = editor.plan("lint/eq-nil", "glob:**/foo.clj").unwrap();
        assert_eq!(plan.strategy, Strategy::CreateDocument);
        assert!(plan.before.is_none());
        assert_eq!(plan.after, "{lint/eq-nil {:excludes [\"glob:**/foo.clj\"]}}\n");
    }

    #[test]
    fn plan_over_buffer_appends() {
        let editor = ExclusionEditor::parse(r#"{lint/eq-nil {:excludes ["a" "b" "c"]}}"#);
        let plan = editor.plan("lint/eq-nil", "d").unwrap();
        assert_eq!(plan.after, r#"{lint/eq-nil {:excludes ["a" "b" "c" "d"]}}"#);
    }

    #[test]
    fn plan_leaves_unrelated_rule_untouched() {
        let text = "{\n performance {:enabled false}\n style/eq-zero {:excludes [\"a.clj\"]}\n}";
        let plan = ExclusionEditor::parse(text).plan("lint/plus-one", "b.clj").unwrap();
        assert!(plan.after.contains(" performance {:enabled false}\n"));
        assert!(plan.after.contains(" style/eq-zero {:excludes [\"a.clj\"]}\n"));
        assert!(plan.after.ends_with(" lint/plus-one {:excludes [\"b.clj\"]}}\n"));
    }

    #[test]
    fn duplicates_are_appended() {
        let text = r#"{r {:excludes ["a"]}}"#;
        let plan = ExclusionEditor::parse(text).plan("r", "a").unwrap();
        assert_eq!(plan.after, r#"{r {:excludes ["a" "a"]}}"#);
    }

    #[test]
    fn rejects_bad_rule_keys() {
        let editor = ExclusionEditor::parse("{}");
        for key in ["", "lint eq", "a}", "\"q\""] {
            assert!(matches!(
                editor.plan(key, "x"),
                Err(ExcludeError::InvalidRuleKey { .. })
            ));
        }
    }

    #[test]
    fn blank_file_is_not_reported_as_malformed() {
        let blank = ExclusionEditor::parse("  \n").plan("r", "a").unwrap();
        assert_eq!(blank.strategy, Strategy::CreateDocument);
        assert!(!blank.replaces_malformed());

        let broken = ExclusionEditor::parse("{r {:enabled").plan("r", "a").unwrap();
        assert_eq!(broken.strategy, Strategy::CreateDocument);
        assert!(broken.replaces_malformed());

        let missing = ExclusionEditor::from_path("/nowhere/.splint.edn", None)
            .plan("r", "a")
            .unwrap();
        assert!(!missing.replaces_malformed());
    }

    #[test]
    fn apply_reports_unchanged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".splint.edn");
        let original = r#"{r {:excludes ["a"]}}"#;
        std::fs::write(&path, original).unwrap();

        let plan = ExclusionEditor::from_path(&path, Some(original))
            .plan("r", "b")
            .unwrap();
        assert!(plan.apply().unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), plan.after);

        let settled = ExclusionPlan {
            edit: Some(Edit::new(&path, 0, plan.after.len(), plan.after.clone(), original)),
            ..plan.clone()
        };
        assert!(!settled.apply().unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), plan.after);
    }
}
