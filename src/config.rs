//! Configuration for vulngate.
//!
//! Settings are layered: built-in defaults, then a YAML file, then
//! `VULNGATE_*` environment variables. CLI flags are applied last by the
//! binary.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;
use crate::resolution::domain::{severity::parse_threshold, CollectionName, Severity};
use crate::shared::security::{read_regular_file, MAX_FILE_SIZE};
use crate::shared::Result;

const CONFIG_DIR: &str = ".vulngate";
const CONFIG_FILENAME: &str = "config.yaml";
const DB_FILENAME: &str = "vulngate.db";

pub const CONFIG_ENV: &str = "VULNGATE_CONFIG";
pub const API_KEY_ENV: &str = "VULNGATE_API_KEY";
pub const DB_PATH_ENV: &str = "VULNGATE_DB_PATH";
pub const OFFLINE_ENV: &str = "VULNGATE_OFFLINE";
pub const ENABLE_AI_SCORE_ENV: &str = "VULNGATE_ENABLE_AI_SCORE";
pub const FAIL_ON_ENV: &str = "VULNGATE_FAIL_ON";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub db_path: Option<PathBuf>,
    pub offline: Option<bool>,
    pub enable_ai_score: Option<bool>,
    pub fail_on: Option<String>,
    pub ignore: Option<Vec<IgnoreEntry>>,
    pub vex: Option<PathBuf>,
    pub collections: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// A vulnerability id to drop from the results.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IgnoreEntry {
    pub id: String,
    pub reason: Option<String>,
}

/// Effective settings after every layer has been applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub db_path: PathBuf,
    pub offline: bool,
    pub enable_ai_score: bool,
    pub fail_on: Option<Severity>,
    pub ignore: Vec<IgnoreEntry>,
    pub vex: Option<PathBuf>,
    pub collections: Vec<CollectionName>,
    pub concurrency: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Problems found while loading that did not stop it. Logged once
    /// the subscriber is installed.
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            db_path: default_db_path(),
            offline: false,
            enable_ai_score: false,
            fail_on: None,
            ignore: Vec::new(),
            vex: None,
            collections: vec![CollectionName::cve()],
            concurrency: 1,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            warnings: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the config file and the process environment.
    ///
    /// The file is `explicit_path` if given, else `$VULNGATE_CONFIG`, else
    /// `~/.vulngate/config.yaml`. Only the last one may be missing.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let env_path = non_empty_env(CONFIG_ENV).map(PathBuf::from);
        let file = match explicit_path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Some(load_config_from_path(&path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(load_config_from_path(&path)?),
                _ => None,
            },
        };

        Self::resolve(file, non_empty_env)
    }

    /// Applies `file` and then the variables returned by `env` over the
    /// defaults. `env` should return `None` for unset or empty variables.
    pub fn resolve<F>(file: Option<ConfigFile>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(file) = file {
            settings.apply_file(file)?;
        }

        if let Some(key) = env(API_KEY_ENV) {
            settings.api_key = Some(key);
        }
        if let Some(path) = env(DB_PATH_ENV) {
            settings.db_path = PathBuf::from(path);
        }
        if let Some(value) = env(OFFLINE_ENV) {
            settings.offline = parse_bool(OFFLINE_ENV, &value)?;
        }
        if let Some(value) = env(ENABLE_AI_SCORE_ENV) {
            settings.enable_ai_score = parse_bool(ENABLE_AI_SCORE_ENV, &value)?;
        }
        if let Some(value) = env(FAIL_ON_ENV) {
            settings.fail_on = parse_fail_on(FAIL_ON_ENV, &value)?;
        }

        Ok(settings)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        for key in file.unknown_fields.keys() {
            self.warnings
                .push(format!("Unknown config field '{}' will be ignored.", key));
        }

        if let Some(key) = file.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(path) = file.db_path {
            self.db_path = path;
        }
        if let Some(offline) = file.offline {
            self.offline = offline;
        }
        if let Some(enabled) = file.enable_ai_score {
            self.enable_ai_score = enabled;
        }
        if let Some(ref value) = file.fail_on {
            self.fail_on = parse_fail_on("fail_on", value)?;
        }
        if let Some(ignore) = file.ignore {
            self.ignore = ignore;
        }
        if let Some(vex) = file.vex {
            self.vex = Some(vex);
        }
        if let Some(collections) = file.collections {
            self.collections = collections
                .iter()
                .map(|name| {
                    CollectionName::new(name).map_err(|e| {
                        anyhow::anyhow!(
                            "Invalid config: collections entry '{}': {}\n\n\
                             💡 Hint: Use Vulners collection types such as \"cve\" or \"exploit\".",
                            name,
                            e
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(concurrency) = file.concurrency {
            if concurrency == 0 {
                bail!(
                    "Invalid config: concurrency must be at least 1.\n\n\
                     💡 Hint: Use 1 for sequential lookups."
                );
            }
            self.concurrency = concurrency;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(ref format) = file.log_format {
            self.log_format = format
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid config: {}", e))?;
        }
        Ok(())
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = read_regular_file(path, "config file", MAX_FILE_SIZE).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(ref ignore) = config.ignore {
        for (i, entry) in ignore.iter().enumerate() {
            if entry.id.trim().is_empty() {
                bail!(
                    "Invalid config: ignore[{}].id must not be empty.\n\n\
                     💡 Hint: Each ignore entry must have a non-empty 'id' field (e.g., \"CVE-2024-1234\").",
                    i
                );
            }
        }
    }
    Ok(())
}

fn parse_fail_on(source: &str, value: &str) -> Result<Option<Severity>> {
    parse_threshold(value).map_err(|e| {
        anyhow::anyhow!(
            "Invalid {}: {}\n\n💡 Hint: Use none, low, medium, high or critical.",
            source,
            e
        )
    })
}

fn parse_bool(source: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("Invalid {}: '{}' is not a boolean", source, value),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn home_dir() -> Option<PathBuf> {
    non_empty_env("HOME")
        .or_else(|| non_empty_env("USERPROFILE"))
        .map(PathBuf::from)
}

fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// `~/.vulngate/vulngate.db`, or the same layout under the temp dir when
/// no home directory is known.
pub fn default_db_path() -> PathBuf {
    home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR)
        .join(DB_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
api_key: file-key
offline: true
fail_on: HIGH
collections:
  - cve
  - exploit
concurrency: 4
log_format: json
ignore:
  - id: CVE-2024-1234
    reason: "Not reachable in our build"
  - id: CVE-2024-5678
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        let ignore = config.ignore.as_ref().unwrap();
        assert_eq!(ignore.len(), 2);
        assert_eq!(ignore[0].reason.as_deref(), Some("Not reachable in our build"));
        assert!(ignore[1].reason.is_none());

        let settings = Settings::resolve(Some(config), no_env).unwrap();
        assert!(settings.offline);
        assert_eq!(settings.fail_on, Some(Severity::High));
        assert_eq!(settings.collections.len(), 2);
        assert_eq!(settings.collections[1].as_str(), "exploit");
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(settings.warnings.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/vulngate/config.yaml"));
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "ignore: [unterminated").unwrap();

        let err = format!("{:#}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_empty_ignore_id_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "ignore:\n  - id: \"  \"\n    reason: blank\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err().to_string();
        assert!(err.contains("ignore[0].id must not be empty"));
    }

    #[test]
    fn test_unknown_fields_become_warnings() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "offline: false\nretry_count: 3\n").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        let settings = Settings::resolve(Some(config), no_env).unwrap();
        assert_eq!(settings.warnings.len(), 1);
        assert!(settings.warnings[0].contains("retry_count"));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(None, no_env).unwrap();
        assert!(settings.api_key.is_none());
        assert!(!settings.offline);
        assert!(!settings.enable_ai_score);
        assert!(settings.fail_on.is_none());
        assert_eq!(settings.collections, vec![CollectionName::cve()]);
        assert_eq!(settings.concurrency, 1);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_format, LogFormat::Compact);
        assert!(settings.db_path.ends_with(".vulngate/vulngate.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            api_key: Some("file-key".to_string()),
            fail_on: Some("low".to_string()),
            ..Default::default()
        };
        let env = |name: &str| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            FAIL_ON_ENV => Some("critical".to_string()),
            OFFLINE_ENV => Some("1".to_string()),
            DB_PATH_ENV => Some("/tmp/cache.db".to_string()),
            _ => None,
        };

        let settings = Settings::resolve(Some(file), env).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.fail_on, Some(Severity::Critical));
        assert!(settings.offline);
        assert_eq!(settings.db_path, PathBuf::from("/tmp/cache.db"));
    }

    #[test]
    fn test_fail_on_none_disables_threshold() {
        let env = |name: &str| (name == FAIL_ON_ENV).then(|| "none".to_string());
        let file = ConfigFile {
            fail_on: Some("high".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(Some(file), env).unwrap();
        assert!(settings.fail_on.is_none());
    }

    #[test]
    fn test_invalid_fail_on_rejected() {
        let file = ConfigFile {
            fail_on: Some("urgent".to_string()),
            ..Default::default()
        };
        let err = Settings::resolve(Some(file), no_env).unwrap_err().to_string();
        assert!(err.contains("Invalid fail_on"));
    }

    #[test]
    fn test_invalid_env_bool_rejected() {
        let env = |name: &str| (name == ENABLE_AI_SCORE_ENV).then(|| "maybe".to_string());
        assert!(Settings::resolve(None, env).is_err());
    }

    #[test]
    fn test_invalid_collection_rejected() {
        let file = ConfigFile {
            collections: Some(vec!["Not A Collection".to_string()]),
            ..Default::default()
        };
        assert!(Settings::resolve(Some(file), no_env).is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let file = ConfigFile {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(Settings::resolve(Some(file), no_env).is_err());
    }
}
