// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Installs the `env_logger` backend behind the `log` facade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logging settings, usually read from the host configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. `"info"`), used when `RUST_LOG` is unset.
    pub level: String,
    /// Per-module overrides, as `(module path, level)` pairs.
    pub filters: Vec<(String, String)>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filters: Vec::new(),
        }
    }
}

/// Failure to install the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A per-module filter named an unknown level.
    #[error("invalid log level '{level}' for module '{module}'")]
    InvalidLevel {
        /// The module the filter applies to.
        module: String,
        /// The unrecognized level.
        level: String,
    },
    /// A global logger was already installed.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Installs the global logger.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::level`]. Calling this
/// more than once returns [`LoggingError::AlreadyInitialized`].
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    use env_logger::{Builder, Env};

    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    for (module, level) in &config.filters {
        let filter = level
            .parse::<log::LevelFilter>()
            .map_err(|_| LoggingError::InvalidLevel {
                module: module.clone(),
                level: level.clone(),
            })?;
        builder.filter_module(module, filter);
    }
    builder.try_init()?;
    log::debug!("Logging initialized with default level '{}'.", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: LoggingConfig = serde_json::from_str(r#"{ "level": "debug" }"#).unwrap();
        assert_eq!(config.level, "debug");
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_invalid_filter_level_is_rejected() {
        let config = LoggingConfig {
            level: "info".to_string(),
            filters: vec![("cachet_agents".to_string(), "loud".to_string())],
        };
        match init_logging(&config) {
            Err(LoggingError::InvalidLevel { module, level }) => {
                assert_eq!(module, "cachet_agents");
                assert_eq!(level, "loud");
            }
            other => panic!("expected invalid level error, got {other:?}"),
        }
    }
}
