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

//! Stable identifiers used to address cached entries.
//!
//! An identity is the full cache slot address: a `key` scoped by a `context`
//! (the namespace that also selects which loader services a request), plus a
//! `locale` for translations. Two identities are the same slot iff every field
//! matches exactly; comparison is ordinal and case-sensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// The contract every cache identity fulfills.
///
/// The supertraits make identities usable as map keys, shareable across
/// threads, and printable in error messages and logs.
pub trait Identity:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The logical key inside the context.
    fn key(&self) -> &str;

    /// The context (namespace) that selects the loader.
    fn context(&self) -> &str;
}

/// Identity of a module, resource, or config entry: a key inside a context.
///
/// Immutable once constructed.
///
/// # Examples
///
/// ```
/// use cachet_core::identity::{Identity, ScopedId};
///
/// let a = ScopedId::new("button", "ui");
/// let b = ScopedId::new("button", "ui");
/// assert_eq!(a, b);
/// assert_eq!(a.context(), "ui");
/// assert_eq!(a.to_string(), "ui:button");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedId {
    key: String,
    context: String,
}

impl ScopedId {
    /// Creates a new identity from a key and its context.
    pub fn new(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            context: context.into(),
        }
    }
}

impl Identity for ScopedId {
    fn key(&self) -> &str {
        &self.key
    }

    fn context(&self) -> &str {
        &self.context
    }
}

impl fmt::Display for ScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.context, self.key)
    }
}

/// Identity of a translation entry: a key inside a context, for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalizedId {
    key: String,
    context: String,
    locale: String,
}

impl LocalizedId {
    /// Creates a new translation identity.
    pub fn new(
        key: impl Into<String>,
        context: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            context: context.into(),
            locale: locale.into(),
        }
    }

    /// The locale this identity addresses.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns the same key and context addressed under another locale.
    pub fn with_locale(&self, locale: impl Into<String>) -> Self {
        Self {
            key: self.key.clone(),
            context: self.context.clone(),
            locale: locale.into(),
        }
    }
}

impl Identity for LocalizedId {
    fn key(&self) -> &str {
        &self.key
    }

    fn context(&self) -> &str {
        &self.context
    }
}

impl fmt::Display for LocalizedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.context, self.key, self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_separately_built_ids_are_equal() {
        let a = ScopedId::new("header", "layout");
        let b = ScopedId::new(String::from("header"), String::from("layout"));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        assert_ne!(ScopedId::new("Header", "layout"), ScopedId::new("header", "layout"));
        assert_ne!(
            LocalizedId::new("greet", "root", "en"),
            LocalizedId::new("greet", "root", "EN")
        );
    }

    #[test]
    fn test_context_is_part_of_identity() {
        assert_ne!(ScopedId::new("header", "a"), ScopedId::new("header", "b"));
    }

    #[test]
    fn test_with_locale_keeps_key_and_context() {
        let ru = LocalizedId::new("greet", "root", "ru");
        let en = ru.with_locale("en");
        assert_eq!(en.key(), "greet");
        assert_eq!(en.context(), "root");
        assert_eq!(en.locale(), "en");
        assert_eq!(ru.locale(), "ru");
    }

    #[test]
    fn test_display() {
        assert_eq!(LocalizedId::new("greet", "root", "en").to_string(), "root:greet@en");
    }
}
