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

//! Translations: a loader registry keyed by locale, plus the resolver that
//! turns paths into translated strings.
//!
//! Lookups for a locale fall back to the default locale, both when loading
//! translation units and when resolving paths against the loaded ones.

mod fallback;
mod locales;
mod registry;
mod translator;

pub use fallback::TranslationLoader;
pub use locales::LocaleSettings;
pub use registry::TranslationRegistry;
pub use translator::{substitute, TranslationPath, Translator};

use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The payload used when no locale has data for a translation unit.
fn empty_translation() -> Value {
    Value::Object(Map::new())
}

fn read_settings(settings: &RwLock<LocaleSettings>) -> RwLockReadGuard<'_, LocaleSettings> {
    settings.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_settings(settings: &RwLock<LocaleSettings>) -> RwLockWriteGuard<'_, LocaleSettings> {
    settings.write().unwrap_or_else(PoisonError::into_inner)
}
