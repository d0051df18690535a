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

//! Host configuration, read from JSON.

use cachet_agents::LocaleSettings;
use cachet_telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read or write a [`CachetConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("cannot access config file '{}': {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The content is not a valid configuration.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachetConfig {
    /// Label used in logs and as the prefix of every registry name.
    pub name: String,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Locales and seed translations.
    pub translations: TranslationConfig,
}

impl Default for CachetConfig {
    fn default() -> Self {
        Self {
            name: "cachet".to_string(),
            logging: LoggingConfig::default(),
            translations: TranslationConfig::default(),
        }
    }
}

impl CachetConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Writes the configuration to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Locale selection and translations known up front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Registered locale codes.
    pub locales: Vec<String>,
    /// Locale translators are built for by default.
    pub current_locale: Option<String>,
    /// Locale used when the requested one has no data.
    pub default_locale: Option<String>,
    /// Translation units stored at startup.
    pub seeds: Vec<TranslationSeed>,
}

impl TranslationConfig {
    /// Builds the locale settings, leaving out a current or default locale
    /// that is not registered.
    pub fn locale_settings(&self) -> LocaleSettings {
        let mut settings = LocaleSettings::new(self.locales.iter().cloned());
        if let Some(locale) = &self.current_locale {
            if let Err(err) = settings.set_current_locale(locale.clone()) {
                log::warn!("Ignoring configured current locale: {err}.");
            }
        }
        if let Some(locale) = &self.default_locale {
            if let Err(err) = settings.set_default_locale(locale.clone()) {
                log::warn!("Ignoring configured default locale: {err}.");
            }
        }
        settings
    }
}

/// Translation units for one locale and context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSeed {
    /// Locale of the units.
    pub locale: String,
    /// Context the units belong to.
    pub context: String,
    /// Units by key.
    pub entries: Map<String, Value>,
}
