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

//! The translation registry.

use super::fallback::{FallbackLoader, TranslationLoader};
use super::locales::LocaleSettings;
use super::translator::Translator;
use super::{read_settings, write_settings};
use crate::registry::{Loaded, LoaderRegistry};
use cachet_core::{ContextLoader, Entry, LoadError, LocaleError, LocalizedId};
use cachet_telemetry::MetricsSnapshot;
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

/// A [`LoaderRegistry`] of translation units, aware of the registered
/// locales.
///
/// Each unit is identified by its key, context and locale, and its payload
/// is the unit's JSON tree. Loaders are wrapped so that a locale without
/// data falls back to the default locale, then to an empty unit.
///
/// Cloning is cheap and shares both the entries and the locale settings.
#[derive(Clone)]
pub struct TranslationRegistry {
    registry: LoaderRegistry<LocalizedId, Value>,
    settings: Arc<RwLock<LocaleSettings>>,
}

impl TranslationRegistry {
    /// Creates an empty registry with no locales.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_locales(name, LocaleSettings::default())
    }

    /// Creates an empty registry with the given locale settings.
    pub fn with_locales(name: impl Into<String>, settings: LocaleSettings) -> Self {
        Self {
            registry: LoaderRegistry::new(name),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &LoaderRegistry<LocalizedId, Value> {
        &self.registry
    }

    /// The registry's name.
    pub fn name(&self) -> String {
        self.registry.name()
    }

    /// Counters of the underlying registry.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.registry.metrics()
    }

    /// A copy of the current locale settings.
    pub fn settings(&self) -> LocaleSettings {
        read_settings(&self.settings).clone()
    }

    /// The registered locales.
    pub fn locales(&self) -> Vec<String> {
        read_settings(&self.settings).locales().to_vec()
    }

    /// Replaces the registered locales, clearing a current or default
    /// locale that is no longer among them.
    pub fn set_locales<S: Into<String>>(&self, locales: impl IntoIterator<Item = S>) {
        write_settings(&self.settings).set_locales(locales);
    }

    /// Whether `locale` is registered.
    pub fn is_locale_exist(&self, locale: &str) -> bool {
        read_settings(&self.settings).is_locale_exist(locale)
    }

    /// The current locale, if any.
    pub fn current_locale(&self) -> Option<String> {
        read_settings(&self.settings)
            .current_locale()
            .map(str::to_string)
    }

    /// Sets the current locale.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::UnknownLocale`] and leaves the current locale
    /// unchanged when `locale` is not registered.
    pub fn set_current_locale(&self, locale: impl Into<String>) -> Result<(), LocaleError> {
        write_settings(&self.settings).set_current_locale(locale)
    }

    /// Clears the current locale.
    pub fn clear_current_locale(&self) {
        write_settings(&self.settings).clear_current_locale();
    }

    /// The default locale, if any.
    pub fn default_locale(&self) -> Option<String> {
        read_settings(&self.settings)
            .default_locale()
            .map(str::to_string)
    }

    /// Sets the default locale.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::UnknownLocale`] and leaves the default locale
    /// unchanged when `locale` is not registered.
    pub fn set_default_locale(&self, locale: impl Into<String>) -> Result<(), LocaleError> {
        write_settings(&self.settings).set_default_locale(locale)
    }

    /// Clears the default locale.
    pub fn clear_default_locale(&self) {
        write_settings(&self.settings).clear_default_locale();
    }

    /// Registers a translation loader for its context, with default-locale
    /// fallback.
    pub fn set_loader(&self, loader: TranslationLoader) {
        self.registry
            .set_loader(FallbackLoader::wrap(loader, Arc::clone(&self.settings)));
    }

    /// Registers a translation loader that is only built when first needed.
    pub fn add_lazy_loader<F>(&self, resolver: F)
    where
        F: FnOnce() -> TranslationLoader + Send + 'static,
    {
        let settings = Arc::clone(&self.settings);
        self.registry
            .add_lazy_loader(move || FallbackLoader::wrap(resolver(), settings));
    }

    /// The loader serving `context`, already wrapped with the fallback.
    pub fn get_loader(&self, context: &str) -> Option<ContextLoader<LocalizedId, Value>> {
        self.registry.get_loader(context)
    }

    /// Loads a translation unit. See [`LoaderRegistry::load`].
    ///
    /// A unit with no data in either the requested or the default locale
    /// settles as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::LoaderNotFound`] when no loader serves the
    /// context, or the loader's own error.
    pub fn load(&self, id: &LocalizedId) -> Result<Loaded<LocalizedId, Value>, LoadError> {
        self.registry.load(id)
    }

    /// Whether the unit is loaded, in exactly this locale.
    pub fn exists(&self, id: &LocalizedId) -> bool {
        self.registry.exists(id)
    }

    /// The loaded unit, in exactly this locale.
    pub fn find_by_id(&self, id: &LocalizedId) -> Option<Entry<LocalizedId, Value>> {
        self.registry.find_by_id(id)
    }

    /// The loaded unit for `locale`, or for the default locale when `locale`
    /// has none.
    pub fn lookup(
        &self,
        key: &str,
        context: &str,
        locale: &str,
    ) -> Option<Entry<LocalizedId, Value>> {
        let id = LocalizedId::new(key, context, locale);
        self.registry.find_by_id(&id).or_else(|| {
            let default = self.default_locale().filter(|default| default != locale)?;
            self.registry.find_by_id(&id.with_locale(default))
        })
    }

    /// Stores translation units for `locale` in `context`, one per top-level
    /// key of `units`, replacing any loaded with the same identity.
    pub fn set_translation_for_locale(
        &self,
        locale: &str,
        units: Map<String, Value>,
        context: &str,
    ) {
        log::debug!(
            "[{}] Setting {} translation unit(s) for '{context}' ({locale}).",
            self.name(),
            units.len()
        );
        let entries = units
            .into_iter()
            .map(|(key, payload)| Entry::new(LocalizedId::new(key, context, locale), payload))
            .collect();
        self.registry.upsert(entries);
    }

    /// A translator for `context` in `locale`.
    pub fn get_translator(&self, context: impl Into<String>, locale: impl Into<String>) -> Translator {
        Translator::new(self.clone(), context, locale)
    }

    /// A translator for `context` in the current locale, if one is set.
    pub fn current_translator(&self, context: impl Into<String>) -> Option<Translator> {
        let locale = self.current_locale()?;
        Some(self.get_translator(context, locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::LoadOutcome;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn en_ru(default: &str) -> TranslationRegistry {
        let mut settings = LocaleSettings::new(["en", "ru"]);
        settings.set_default_locale(default).unwrap();
        TranslationRegistry::with_locales("test.translations", settings)
    }

    #[test]
    fn test_locale_guards() {
        let translations = en_ru("en");
        assert!(translations.is_locale_exist("ru"));
        assert!(!translations.is_locale_exist("de"));

        translations.set_current_locale("ru").unwrap();
        assert!(translations.set_current_locale("de").is_err());
        assert_eq!(translations.current_locale().as_deref(), Some("ru"));

        translations.set_locales(["en", "de"]);
        assert_eq!(translations.locales(), vec!["en", "de"]);
        assert_eq!(translations.current_locale(), None);
        assert_eq!(translations.default_locale().as_deref(), Some("en"));

        translations.clear_default_locale();
        assert_eq!(translations.settings(), LocaleSettings::new(["en", "de"]));
    }

    #[test]
    fn test_lookup_falls_back_to_default_locale() {
        let translations = en_ru("en");
        translations.set_translation_for_locale(
            "en",
            [("greet".to_string(), json!({ "hello": "Hello" }))]
                .into_iter()
                .collect(),
            "root",
        );

        let entry = translations.lookup("greet", "root", "ru").unwrap();
        assert_eq!(entry.id(), &LocalizedId::new("greet", "root", "en"));
        assert!(!translations.exists(&LocalizedId::new("greet", "root", "ru")));

        translations.clear_default_locale();
        assert!(translations.lookup("greet", "root", "ru").is_none());
    }

    #[test]
    fn test_current_translator_needs_a_current_locale() {
        let translations = en_ru("en");
        assert!(translations.current_translator("root").is_none());

        translations.set_current_locale("ru").unwrap();
        let translator = translations.current_translator("root").unwrap();
        assert_eq!(translator.locale(), "ru");
        assert_eq!(translator.context(), "root");
    }

    #[test]
    fn test_sync_load_caches_under_requested_locale() {
        let translations = en_ru("en");
        translations.set_loader(ContextLoader::from_fn("root", |id: &LocalizedId| {
            let data = (id.locale() == "en").then(|| json!({ "hello": "Hello" }));
            Ok(LoadOutcome::Immediate(data))
        }));

        let id = LocalizedId::new("greet", "root", "ru");
        let entry = translations.load(&id).unwrap().ready().unwrap();
        assert_eq!(entry.payload(), &json!({ "hello": "Hello" }));
        assert!(translations.exists(&id));
    }

    #[tokio::test]
    async fn test_async_fallback_is_shared_by_concurrent_callers() {
        let translations = en_ru("en");
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();
        let gate = futures::FutureExt::shared(gate);

        translations.set_loader(ContextLoader::from_fn("root", {
            let calls = calls.clone();
            move |id: &LocalizedId| {
                calls.fetch_add(1, Ordering::SeqCst);
                let gate = gate.clone();
                let data = (id.locale() == "en").then(|| json!({ "hello": "Hello ${name}!" }));
                Ok(LoadOutcome::pending(async move {
                    let _ = gate.await;
                    Ok(data)
                }))
            }
        }));

        let id = LocalizedId::new("greet", "root", "ru");
        let first = translations.load(&id).unwrap().pending().unwrap();
        let second = translations.load(&id).unwrap().pending().unwrap();
        assert!(first.ptr_eq(&second));

        release.send(()).unwrap();
        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap().payload(), second.unwrap().payload());

        // One call for `ru`, one for the `en` fallback.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(translations.registry().in_flight_len(), 0);

        let translator = translations.get_translator("root", "ru").with_prefix("greet");
        assert_eq!(
            translator.translate("hello", &[("name", json!("World"))], json!(null)),
            json!("Hello World!")
        );
    }

    #[test]
    fn test_lazy_loader_is_wrapped_with_fallback() {
        let translations = en_ru("en");
        translations.add_lazy_loader(|| {
            ContextLoader::from_fn("root", |id: &LocalizedId| {
                Ok(LoadOutcome::Immediate(
                    (id.locale() == "en").then(|| json!({ "title": "Home" })),
                ))
            })
        });

        let entry = translations
            .load(&LocalizedId::new("page", "root", "ru"))
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(entry.payload(), &json!({ "title": "Home" }));
        assert!(translations.get_loader("root").is_some());
    }

    #[test]
    fn test_unit_missing_everywhere_loads_empty() {
        let translations = en_ru("en");
        translations.set_loader(ContextLoader::from_fn("root", |_: &LocalizedId| {
            Ok(LoadOutcome::Immediate(None))
        }));

        let entry = translations
            .load(&LocalizedId::new("nothing", "root", "ru"))
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(entry.payload(), &json!({}));
    }

    #[test]
    fn test_unknown_context_is_not_found() {
        let translations = en_ru("en");
        let err = translations
            .load(&LocalizedId::new("greet", "nowhere", "en"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
