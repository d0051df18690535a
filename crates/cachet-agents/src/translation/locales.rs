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

//! The locale set and the current/default locale guarded against it.

use cachet_core::LocaleError;

/// Registered locales plus the current and default selections.
///
/// # Invariants
/// - `current` and `default`, when set, are always members of `locales`.
/// - Replacing `locales` clears a selection that is no longer a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSettings {
    locales: Vec<String>,
    current: Option<String>,
    default: Option<String>,
}

impl LocaleSettings {
    /// Creates settings with the given locales and no selection.
    pub fn new<S: Into<String>>(locales: impl IntoIterator<Item = S>) -> Self {
        Self {
            locales: locales.into_iter().map(Into::into).collect(),
            current: None,
            default: None,
        }
    }

    /// The registered locales, in registration order.
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Whether `locale` is registered.
    pub fn is_locale_exist(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Replaces the locale set, clearing selections that fall out of it.
    pub fn set_locales<S: Into<String>>(&mut self, locales: impl IntoIterator<Item = S>) {
        self.locales = locales.into_iter().map(Into::into).collect();

        if let Some(current) = self.current.take_if(|c| !self.locales.contains(c)) {
            log::debug!("Current locale '{current}' is no longer registered; cleared.");
        }
        if let Some(default) = self.default.take_if(|d| !self.locales.contains(d)) {
            log::debug!("Default locale '{default}' is no longer registered; cleared.");
        }
    }

    /// The current locale.
    pub fn current_locale(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Selects the current locale.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::UnknownLocale`] and leaves the selection
    /// unchanged when `locale` is not registered.
    pub fn set_current_locale(&mut self, locale: impl Into<String>) -> Result<(), LocaleError> {
        let locale = self.checked(locale.into())?;
        self.current = Some(locale);
        Ok(())
    }

    /// Clears the current locale.
    pub fn clear_current_locale(&mut self) {
        self.current = None;
    }

    /// The default (fallback) locale.
    pub fn default_locale(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Selects the default locale.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::UnknownLocale`] and leaves the selection
    /// unchanged when `locale` is not registered.
    pub fn set_default_locale(&mut self, locale: impl Into<String>) -> Result<(), LocaleError> {
        let locale = self.checked(locale.into())?;
        self.default = Some(locale);
        Ok(())
    }

    /// Clears the default locale.
    pub fn clear_default_locale(&mut self) {
        self.default = None;
    }

    fn checked(&self, locale: String) -> Result<String, LocaleError> {
        if self.is_locale_exist(&locale) {
            Ok(locale)
        } else {
            log::warn!("Rejected locale '{locale}': not one of {:?}.", self.locales);
            Err(LocaleError::UnknownLocale { locale })
        }
    }
}
