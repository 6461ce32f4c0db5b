//! Adding and checking rule exclusions in a project's `.splint.edn`.
//!
//! The file is read fresh for every call and fully rewritten on success.
//! There is no locking: concurrent writers on the same file race and the
//! last write wins.

pub mod editor;
pub mod errors;
pub mod operations;
pub mod query;

pub use editor::{ExclusionEditor, ExclusionPlan};
pub use errors::ExcludeError;
pub use operations::{new_document, Splice, Strategy};
pub use query::ExclusionQuery;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".splint.edn";

pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE_NAME)
}

/// Current config text, or `None` when the file does not exist.
pub fn read_config(project_root: &Path) -> Result<Option<String>, ExcludeError> {
    let path = config_path(project_root);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ExcludeError::Io { path, source }),
    }
}

/// Plan an exclusion against the project's config without writing it.
pub fn plan_exclusion(
    project_root: &Path,
    rule_key: &str,
    file_path: &str,
) -> Result<ExclusionPlan, ExcludeError> {
    let content = read_config(project_root)?;
    ExclusionEditor::from_path(config_path(project_root), content.as_deref())
        .plan(rule_key, file_path)
}

/// Add `file_path` to `rule_key`'s `:excludes`, creating the rule or the
/// whole file as needed.
///
/// The new text is computed in full before anything is written; on error
/// the file is left as it was. Returns the strategy that was applied.
pub fn add_exclusion(
    project_root: &Path,
    rule_key: &str,
    file_path: &str,
) -> Result<Strategy, ExcludeError> {
    let plan = plan_exclusion(project_root, rule_key, file_path)?;
    if plan.replaces_malformed() {
        tracing::warn!(
            file = %plan.file.display(),
            "config has no closing brace, replacing it with a fresh document"
        );
    }
    plan.apply()?;
    Ok(plan.strategy)
}

/// Whether `rule_key` already excludes `file_path`.
///
/// Never fails: a missing or unreadable config counts as "not excluded".
pub fn rule_has_exclusion(project_root: &Path, rule_key: &str, file_path: &str) -> bool {
    match read_config(project_root) {
        Ok(Some(content)) => ExclusionQuery::new(&content).contains(rule_key, file_path),
        Ok(None) => false,
        Err(err) => {
            tracing::debug!(error = %err, "could not read config");
            false
        }
    }
}
