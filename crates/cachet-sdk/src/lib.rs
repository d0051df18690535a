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

//! The public-facing API of Cachet.
//!
//! A [`Cachet`] bundles the four registries an application works with:
//! modules, resources, configs and translations. Each is an independent
//! [`LoaderRegistry`] (the translation one being a [`TranslationRegistry`]);
//! the handle owns no global state, so several can coexist.

#![warn(missing_docs)]

pub mod config;

pub use config::{CachetConfig, ConfigError, TranslationConfig, TranslationSeed};

use cachet_agents::{LoaderRegistry, LocaleSettings, TranslationRegistry};
use cachet_core::ScopedId;
use cachet_telemetry::MetricsSnapshot;
use serde_json::Value;

/// Everything a host needs to register loaders and resolve entries.
pub mod prelude {
    pub use crate::config::{CachetConfig, TranslationConfig, TranslationSeed};
    pub use crate::Cachet;
    pub use cachet_agents::{
        Loaded, LoaderRegistry, LocaleSettings, PendingLoad, TranslationLoader, TranslationPath,
        TranslationRegistry, Translator,
    };
    pub use cachet_core::{
        ContextLoader, Entry, Identity, LoadError, LoadOutcome, Loader, LocaleError, LocalizedId,
        ScopedId, TranslateError,
    };
    pub use cachet_data::{EntryStore, IdentityStore};
    pub use cachet_telemetry::{init_logging, LoggingConfig, MetricsSnapshot};
}

/// The module, resource, config and translation registries of one
/// application.
///
/// The payload types default to [`serde_json::Value`]. Cloning is cheap and
/// shares every registry.
pub struct Cachet<M = Value, R = Value, C = Value> {
    name: String,
    modules: LoaderRegistry<ScopedId, M>,
    resources: LoaderRegistry<ScopedId, R>,
    configs: LoaderRegistry<ScopedId, C>,
    translations: TranslationRegistry,
}

impl<M, R, C> Clone for Cachet<M, R, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            modules: self.modules.clone(),
            resources: self.resources.clone(),
            configs: self.configs.clone(),
            translations: self.translations.clone(),
        }
    }
}

impl<M, R, C> Cachet<M, R, C>
where
    M: Send + Sync + 'static,
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Creates empty registries named after `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_locales(name.into(), LocaleSettings::default())
    }

    /// Creates registries from a configuration, applying its locales and
    /// seeding its translations.
    pub fn from_config(config: &CachetConfig) -> Self {
        let translations = &config.translations;
        let cachet = Self::with_locales(config.name.clone(), translations.locale_settings());

        for seed in &translations.seeds {
            cachet
                .translations
                .set_translation_for_locale(&seed.locale, seed.entries.clone(), &seed.context);
        }
        log::info!(
            "Cache '{}' ready with {} locale(s) and {} translation seed(s).",
            cachet.name,
            translations.locales.len(),
            translations.seeds.len()
        );
        cachet
    }

    fn with_locales(name: String, locales: LocaleSettings) -> Self {
        log::debug!("Creating cache '{name}'.");
        Self {
            modules: LoaderRegistry::new(format!("{name}.modules")),
            resources: LoaderRegistry::new(format!("{name}.resources")),
            configs: LoaderRegistry::new(format!("{name}.configs")),
            translations: TranslationRegistry::with_locales(format!("{name}.translations"), locales),
            name,
        }
    }

    /// The application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module registry.
    pub fn modules(&self) -> &LoaderRegistry<ScopedId, M> {
        &self.modules
    }

    /// The resource registry.
    pub fn resources(&self) -> &LoaderRegistry<ScopedId, R> {
        &self.resources
    }

    /// The config registry.
    pub fn configs(&self) -> &LoaderRegistry<ScopedId, C> {
        &self.configs
    }

    /// The translation registry.
    pub fn translations(&self) -> &TranslationRegistry {
        &self.translations
    }

    /// Counters of every registry, by registry name.
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        vec![
            (self.modules.name(), self.modules.metrics()),
            (self.resources.name(), self.resources.metrics()),
            (self.configs.name(), self.configs.metrics()),
            (self.translations.name(), self.translations.metrics()),
        ]
    }

    /// Logs a summary of every registry's counters.
    pub fn log_metrics_summary(&self) {
        log::info!("--- Cache Summary: {} ---", self.name);
        for (registry, snapshot) in self.metrics() {
            log::info!(
                "  {registry}: {} hit(s), {} join(s), {} load(s), {} failure(s), {} stale",
                snapshot.cache_hits,
                snapshot.in_flight_joins,
                snapshot.loader_invocations,
                snapshot.load_failures,
                snapshot.stale_discards
            );
        }
    }
}
