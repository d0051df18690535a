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

//! Wraps translation loaders with the default-locale fallback.

use super::locales::LocaleSettings;
use super::{empty_translation, read_settings};
use cachet_core::{ContextLoader, LoadError, LoadOutcome, Loader, LocalizedId};
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// A translation loader as supplied by the host: it may have nothing for a
/// locale, which it reports as `None`.
pub type TranslationLoader = ContextLoader<LocalizedId, Option<Value>>;

/// Asks the wrapped loader for the requested locale, then for the default
/// locale, and settles on an empty translation when neither has data.
///
/// The default locale is read when the load starts. A request already in the
/// default locale is not retried.
pub(crate) struct FallbackLoader {
    inner: TranslationLoader,
    settings: Arc<RwLock<LocaleSettings>>,
}

impl FallbackLoader {
    pub(crate) fn wrap(
        inner: TranslationLoader,
        settings: Arc<RwLock<LocaleSettings>>,
    ) -> ContextLoader<LocalizedId, Value> {
        let context = inner.context().to_string();
        ContextLoader::new(context, Self { inner, settings })
    }

    fn fallback_id(&self, id: &LocalizedId) -> Option<LocalizedId> {
        read_settings(&self.settings)
            .default_locale()
            .filter(|default| *default != id.locale())
            .map(|default| id.with_locale(default))
    }
}

/// Loads `id` and substitutes an empty translation for a missing one.
fn load_or_empty(
    loader: &TranslationLoader,
    id: &LocalizedId,
) -> Result<LoadOutcome<Value>, LoadError> {
    log::trace!("Falling back to '{id}'.");
    Ok(loader
        .load(id)?
        .map(|payload| payload.unwrap_or_else(empty_translation)))
}

impl Loader<LocalizedId, Value> for FallbackLoader {
    fn load(&self, id: &LocalizedId) -> Result<LoadOutcome<Value>, LoadError> {
        let fallback = self.fallback_id(id);

        match self.inner.load(id)? {
            LoadOutcome::Immediate(Some(payload)) => Ok(LoadOutcome::Immediate(payload)),
            LoadOutcome::Immediate(None) => match fallback {
                Some(fallback) => load_or_empty(&self.inner, &fallback),
                None => Ok(LoadOutcome::Immediate(empty_translation())),
            },
            LoadOutcome::Pending(primary) => {
                let inner = self.inner.clone();
                Ok(LoadOutcome::pending(async move {
                    match primary.await? {
                        Some(payload) => Ok(payload),
                        None => match fallback {
                            Some(fallback) => load_or_empty(&inner, &fallback)?.settle().await,
                            None => Ok(empty_translation()),
                        },
                    }
                }))
            }
        }
    }
}
