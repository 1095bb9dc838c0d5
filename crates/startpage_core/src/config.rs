//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve the data directory, log settings and default search engine.
//!
//! # Invariants
//! - Precedence is environment over `config.json` over built-in defaults.
//! - Unknown keys in `config.json` are rejected.
//! - `log_dir` is absolute after resolution.

use crate::logging::{default_log_level, normalize_level};
use crate::model::search::SearchEngine;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "STARTPAGE_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "STARTPAGE_LOG_LEVEL";

const APP_DIR_NAME: &str = "startpage";
const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "startpage.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
    pub default_engine: SearchEngine,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
struct ConfigFile {
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    default_engine: Option<SearchEngine>,
}

#[derive(Debug)]
pub enum ConfigError {
    /// No platform data directory and no override was given.
    NoDataDir,
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "no data directory available; set {ENV_DATA_DIR}"
            ),
            Self::Read { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config file `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::NoDataDir | Self::Invalid(_) => None,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(|name| std::env::var(name).ok())
    }

    /// Resolves configuration reading variables through `env`.
    pub fn load_with_env(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match env(ENV_DATA_DIR).filter(|value| !value.trim().is_empty()) {
            Some(value) => PathBuf::from(value.trim()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };
        if !data_dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "data directory must be absolute, got `{}`",
                data_dir.display()
            )));
        }

        let file = read_config_file(&data_dir.join(CONFIG_FILE_NAME))?;

        let level_source = env(ENV_LOG_LEVEL)
            .or(file.log_level)
            .unwrap_or_else(|| default_log_level().to_string());
        let log_level = normalize_level(&level_source)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        let log_dir = match file.log_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => data_dir.join(dir),
            None => data_dir.join("logs"),
        };

        Ok(Self {
            data_dir,
            log_level,
            log_dir,
            default_engine: file.default_engine.unwrap_or_default(),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ConfigFile::default())
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let config = CoreConfig::load_with_env(env_with(&[(ENV_DATA_DIR, data_dir)])).unwrap();

        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.log_dir, dir.path().join("logs"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.default_engine, SearchEngine::Bing);
        assert_eq!(config.db_path(), dir.path().join("startpage.sqlite3"));
    }

    #[test]
    fn file_values_and_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "log_level": "warn", "log_dir": "diag", "default_engine": "duckduckgo" }"#,
        )
        .unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let from_file =
            CoreConfig::load_with_env(env_with(&[(ENV_DATA_DIR, data_dir)])).unwrap();
        assert_eq!(from_file.log_level, "warn");
        assert_eq!(from_file.log_dir, dir.path().join("diag"));
        assert_eq!(from_file.default_engine, SearchEngine::DuckDuckGo);

        let from_env = CoreConfig::load_with_env(env_with(&[
            (ENV_DATA_DIR, data_dir),
            (ENV_LOG_LEVEL, "ERROR"),
        ]))
        .unwrap();
        assert_eq!(from_env.log_level, "error");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_levels() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{ "theme": "dark" }"#).unwrap();
        assert!(matches!(
            CoreConfig::load_with_env(env_with(&[(ENV_DATA_DIR, data_dir)])),
            Err(ConfigError::Parse { .. })
        ));

        std::fs::remove_file(dir.path().join("config.json")).unwrap();
        assert!(matches!(
            CoreConfig::load_with_env(env_with(&[
                (ENV_DATA_DIR, data_dir),
                (ENV_LOG_LEVEL, "loud"),
            ])),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            CoreConfig::load_with_env(env_with(&[(ENV_DATA_DIR, "relative/dir")])),
            Err(ConfigError::Invalid(_))
        ));
    }
}
