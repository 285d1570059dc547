use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Loads `path` (defaults when it does not exist), then applies environment overrides.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        AppConfig::default()
    };
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

pub fn apply_env_overrides(config: &mut AppConfig) {
    apply_env_overrides_from(config, |key| std::env::var(key).ok());
}

/// Applies `MEDFLY_*` overrides read through `lookup`. Unparsable values are logged and ignored.
pub fn apply_env_overrides_from(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let read = |key: &str| {
        lookup(key)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(url) = read("MEDFLY_BACKEND_URL") {
        config.backend.url = url;
    }
    if let Some(key) = read("MEDFLY_ANON_KEY") {
        config.backend.anon_key = key;
    }
    if let Some(password) = read("MEDFLY_ADMIN_PASSWORD") {
        config.admin.password = password;
    }
    if let Some(limit) = parse_override(read("MEDFLY_SEARCH_LIMIT"), "MEDFLY_SEARCH_LIMIT") {
        config.search.limit = limit;
    }
    if let Some(buffer) = parse_override(read("MEDFLY_CHANNEL_BUFFER"), "MEDFLY_CHANNEL_BUFFER") {
        config.store.channel_buffer = buffer;
    }
}

fn parse_override<T>(raw: Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("invalid {key}, ignoring: {err}");
            None
        }
    }
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.search.limit == 0 {
        return Err(ConfigError::Invalid("search.limit must be positive".into()));
    }
    if config.store.channel_buffer == 0 {
        return Err(ConfigError::Invalid(
            "store.channel_buffer must be positive".into(),
        ));
    }
    Ok(())
}
