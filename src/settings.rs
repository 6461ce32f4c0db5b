//! User settings for running splint.
//!
//! Stored as TOML, by default at `~/.config/splint-patcher/settings.toml`:
//!
//! ```toml
//! executable_path = "splint"
//! enable_auto_analysis = true
//! analysis_timeout_seconds = 30
//! additional_args = "--parallel"
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub executable_path: String,
    pub enable_auto_analysis: bool,
    pub analysis_timeout_seconds: u64,
    /// Extra arguments, split on whitespace
    pub additional_args: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            executable_path: "splint".to_string(),
            enable_auto_analysis: true,
            analysis_timeout_seconds: 30,
            additional_args: String::new(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.executable_path.trim().is_empty() {
            return Err("executable_path must not be empty".to_string());
        }
        if self.analysis_timeout_seconds == 0 {
            return Err("analysis_timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_seconds)
    }

    /// Arguments splint is invoked with to analyse `file`.
    pub fn analysis_args(&self, file: &str) -> Vec<String> {
        let mut args = vec![file.to_string(), "--output".to_string(), "json".to_string()];
        args.extend(self.additional_args.split_whitespace().map(str::to_string));
        args
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Invalid {
        path: Option<PathBuf>,
        message: String,
    },
}

impl SettingsError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            SettingsError::Toml { path: None, source } => SettingsError::Toml {
                path: Some(path.to_path_buf()),
                source,
            },
            SettingsError::Invalid {
                path: None,
                message,
            } => SettingsError::Invalid {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "failed to read settings from {}: {}", path.display(), source)
            }
            SettingsError::Toml { path, source } => match path {
                Some(path) => write!(f, "failed to parse settings ({}): {}", path.display(), source),
                None => write!(f, "failed to parse settings: {}", source),
            },
            SettingsError::Invalid { path, message } => match path {
                Some(path) => write!(f, "invalid settings ({}): {}", path.display(), message),
                None => write!(f, "invalid settings: {}", message),
            },
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Toml { source, .. } => Some(source),
            SettingsError::Invalid { .. } => None,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml_edit::de::from_str(input)
        .map_err(|source| SettingsError::Toml { path: None, source })?;
    settings
        .validate()
        .map_err(|message| SettingsError::Invalid { path: None, message })?;
    Ok(settings)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// `$HOME/.config/splint-patcher/settings.toml`, if a home directory is known.
pub fn default_settings_path() -> Option<PathBuf> {
    home::home_dir().map(|home| {
        home.join(".config")
            .join("splint-patcher")
            .join("settings.toml")
    })
}

/// Settings from the default location, or defaults when there is no file.
pub fn load_default() -> Result<Settings, SettingsError> {
    match default_settings_path() {
        Some(path) if path.is_file() => load_from_path(path),
        _ => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(load_from_str("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = load_from_str("executable_path = \"/opt/splint/bin/splint\"\n").unwrap();
        assert_eq!(settings.executable_path, "/opt/splint/bin/splint");
        assert!(settings.enable_auto_analysis);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = load_from_str("analysis_timeout_seconds = 0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(err.to_string().contains("analysis_timeout_seconds"));
    }

    #[test]
    fn bad_toml_is_reported() {
        let err = load_from_str("enable_auto_analysis = \"yes\"").unwrap_err();
        assert!(matches!(err, SettingsError::Toml { path: None, .. }));
    }

    #[test]
    fn analysis_args_split_extras() {
        let settings = Settings {
            additional_args: "  --parallel   --silent ".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.analysis_args("src/core.clj"),
            vec!["src/core.clj", "--output", "json", "--parallel", "--silent"]
        );
        assert_eq!(
            Settings::default().analysis_args("a.clj"),
            vec!["a.clj", "--output", "json"]
        );
    }

    #[test]
    fn load_from_path_attaches_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "analysis_timeout_seconds = 0\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { path: Some(_), .. }));

        let missing = load_from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, SettingsError::Io { .. }));
    }
}
