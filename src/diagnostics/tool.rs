use crate::diagnostics::decoder::decode;
use crate::diagnostics::record::DiagnosticRecord;
use std::path::Path;
use thiserror::Error;

const LINTABLE_EXTENSIONS: &[&str] = &["clj", "cljs", "cljc"];

/// Clojure sources splint knows how to lint.
pub fn is_lintable_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LINTABLE_EXTENSIONS.contains(&ext))
}

/// Captured result of one splint run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// The tool died before reporting anything.
    #[error("splint failed: {0}")]
    Critical(String),
}

impl ToolOutput {
    /// The stdout to decode, unless the run failed outright.
    ///
    /// splint exits non-zero whenever it finds issues, so a failing exit code
    /// alone is not a failure: only an empty stdout paired with stderr noise is.
    pub fn classify(&self) -> Result<&str, ToolFailure> {
        if self.exit_code != 0 && self.stdout.trim().is_empty() && !self.stderr.trim().is_empty() {
            return Err(ToolFailure::Critical(self.stderr.trim().to_string()));
        }
        Ok(&self.stdout)
    }

    pub fn decode(&self) -> Result<Vec<DiagnosticRecord>, ToolFailure> {
        self.classify().map(decode)
    }
}
