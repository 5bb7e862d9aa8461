//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Preferences are resolved in this order (later overrides earlier):
//! 1. Default values (everything off)
//! 2. Config file (`--config` / `$REFTAGGER_CONFIG`)
//! 3. Action inputs from the environment
//! 4. CLI flags (not handled here)
//!
//! # Action Inputs
//!
//! - `INPUT_PUBLISH_LATEST` - maintain the `latest` ref
//! - `INPUT_PUBLISH_LATEST_TAG` - deprecated alias, consulted only when
//!   `INPUT_PUBLISH_LATEST` is unset
//! - `INPUT_PREFER_BRANCH_RELEASES` - keep pointers under `refs/heads/`
//!
//! `true` in any case turns a preference on; any other value turns it off,
//! with a warning unless it is `false`. An empty value counts as unset, since
//! the runner exports inputs the workflow did not set as empty strings.
//!
//! # Example
//!
//! ```
//! use reftagger::core::config::Config;
//! use std::collections::HashMap;
//!
//! let env: HashMap<&str, &str> = [("INPUT_PUBLISH_LATEST", "TRUE")].into();
//! let loaded = Config::load_with(None, |key| env.get(key).map(|v| v.to_string())).unwrap();
//! assert!(loaded.preferences.publish_latest);
//! assert!(!loaded.preferences.prefer_branch_release);
//! ```

pub mod schema;

pub use schema::{FileConfig, Preferences};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input carrying the publish-latest preference.
pub const INPUT_PUBLISH_LATEST: &str = "INPUT_PUBLISH_LATEST";
/// Deprecated spelling of [`INPUT_PUBLISH_LATEST`].
pub const INPUT_PUBLISH_LATEST_TAG: &str = "INPUT_PUBLISH_LATEST_TAG";
/// Input carrying the branch-release preference.
pub const INPUT_PREFER_BRANCH_RELEASES: &str = "INPUT_PREFER_BRANCH_RELEASES";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Warnings generated during config loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The setting that triggered the warning.
    pub key: String,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The resolved preferences.
    pub preferences: Preferences,
    /// Path of the config file that was read, if any.
    pub loaded_from: Option<PathBuf>,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Configuration loader.
pub struct Config;

impl Config {
    /// Load preferences from an optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(file: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(file, |key| std::env::var(key).ok())
    }

    /// Load preferences with an explicit environment lookup.
    pub fn load_with<F>(file: Option<&Path>, env: F) -> Result<ConfigLoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let mut preferences = Preferences::default();

        // 2. Config file
        let file_config = match file {
            Some(path) => Some(Self::read_file(path)?),
            None => None,
        };
        if let Some(ref fc) = file_config {
            if let Some(v) = fc.publish_latest {
                preferences.publish_latest = v;
            }
            if let Some(v) = fc.prefer_branch_release {
                preferences.prefer_branch_release = v;
            }
        }

        // 3. Action inputs
        match read_bool(&env, INPUT_PUBLISH_LATEST, &mut warnings) {
            Some(v) => preferences.publish_latest = v,
            None => {
                if let Some(v) = read_bool(&env, INPUT_PUBLISH_LATEST_TAG, &mut warnings) {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "{} is deprecated, use {} instead",
                            INPUT_PUBLISH_LATEST_TAG, INPUT_PUBLISH_LATEST
                        ),
                        key: INPUT_PUBLISH_LATEST_TAG.to_string(),
                    });
                    preferences.publish_latest = v;
                }
            }
        }
        if let Some(v) = read_bool(&env, INPUT_PREFER_BRANCH_RELEASES, &mut warnings) {
            preferences.prefer_branch_release = v;
        }

        Ok(ConfigLoadResult {
            preferences,
            loaded_from: file.map(Path::to_path_buf),
            warnings,
        })
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Parse a boolean input, treating missing and empty values as unset.
///
/// Only `true` is true; unrecognised values read as false with a warning.
fn read_bool<F>(env: &F, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if value.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if !value.eq_ignore_ascii_case("false") {
        warnings.push(ConfigWarning {
            message: format!("{key}='{raw}' is not true or false, treating it as false"),
            key: key.to_string(),
        });
    }
    Some(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn load(file: Option<&Path>, vars: &[(&str, &str)]) -> Result<ConfigLoadResult, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load_with(file, |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let result = load(None, &[]).unwrap();
        assert_eq!(result.preferences, Preferences::default());
        assert!(result.warnings.is_empty());
        assert!(result.loaded_from.is_none());
    }

    #[test]
    fn inputs_are_case_insensitive() {
        let result = load(
            None,
            &[
                (INPUT_PUBLISH_LATEST, "True"),
                (INPUT_PREFER_BRANCH_RELEASES, "TRUE"),
            ],
        )
        .unwrap();
        assert!(result.preferences.publish_latest);
        assert!(result.preferences.prefer_branch_release);
    }

    #[test]
    fn empty_input_is_unset() {
        let result = load(None, &[(INPUT_PUBLISH_LATEST, "")]).unwrap();
        assert!(!result.preferences.publish_latest);
    }

    #[test]
    fn deprecated_alias_used_with_warning() {
        let result = load(None, &[(INPUT_PUBLISH_LATEST_TAG, "true")]).unwrap();
        assert!(result.preferences.publish_latest);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].key, INPUT_PUBLISH_LATEST_TAG);
    }

    #[test]
    fn new_input_wins_over_alias() {
        let result = load(
            None,
            &[
                (INPUT_PUBLISH_LATEST, "false"),
                (INPUT_PUBLISH_LATEST_TAG, "true"),
            ],
        )
        .unwrap();
        assert!(!result.preferences.publish_latest);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unrecognised_value_is_false_with_warning() {
        let result = load(
            None,
            &[
                (INPUT_PUBLISH_LATEST, "true"),
                (INPUT_PREFER_BRANCH_RELEASES, "yes"),
            ],
        )
        .unwrap();
        assert!(result.preferences.publish_latest);
        assert!(!result.preferences.prefer_branch_release);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].key, INPUT_PREFER_BRANCH_RELEASES);
        assert!(result.warnings[0].message.contains("'yes'"));
    }

    #[test]
    fn unrecognised_value_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reftagger.toml");
        fs::write(&path, "publish_latest = true").unwrap();
        let result = load(Some(&path), &[(INPUT_PUBLISH_LATEST, "1")]).unwrap();
        assert!(!result.preferences.publish_latest);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn file_then_env_precedence() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reftagger.toml");
        fs::write(
            &path,
            r#"
            publish_latest = true
            prefer_branch_release = true
            "#,
        )
        .unwrap();

        let from_file = load(Some(&path), &[]).unwrap();
        assert!(from_file.preferences.publish_latest);
        assert!(from_file.preferences.prefer_branch_release);
        assert_eq!(from_file.loaded_from.as_deref(), Some(path.as_path()));

        let overridden = load(Some(&path), &[(INPUT_PREFER_BRANCH_RELEASES, "false")]).unwrap();
        assert!(overridden.preferences.publish_latest);
        assert!(!overridden.preferences.prefer_branch_release);
    }

    #[test]
    fn missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("nope.toml")), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "publish_latest = \"maybe\"").unwrap();
        let err = load(Some(&path), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
