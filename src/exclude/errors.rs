use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExcludeError {
    #[error("invalid rule key '{key}': {message}")]
    InvalidRuleKey { key: String, message: String },

    #[error("rule '{rule}' has an :excludes vector with no closing ']'")]
    UnterminatedExcludes { rule: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config: {0}")]
    Edit(#[from] crate::edit::EditError),
}
