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

//! Defines the error kinds surfaced by registries and translators.

use crate::identity::Identity;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// A loader-raised error, shared between every caller of a deduplicated load.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// An error produced while resolving an identity to an entry.
///
/// `LoadError` is `Clone` because one pending load is observed by every
/// caller that joined it, and each caller receives the same failure.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// No loader is registered for the identity's context.
    #[error("no loader registered for context '{context}' (requested '{id}')")]
    LoaderNotFound {
        /// The identity that could not be loaded, rendered for display.
        id: String,
        /// The context no loader was found for.
        context: String,
    },
    /// The loader itself failed. The original error is passed through as-is.
    #[error(transparent)]
    Loader(SharedError),
}

impl LoadError {
    /// Builds the error returned when no loader serves `id`'s context.
    pub fn not_found<I: Identity>(id: &I) -> Self {
        Self::LoaderNotFound {
            id: id.to_string(),
            context: id.context().to_string(),
        }
    }

    /// Wraps an error raised by a loader.
    pub fn loader(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Loader(Arc::from(err.into()))
    }

    /// Returns the loader-raised error as a concrete type, if it is one.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Loader(inner) => inner.downcast_ref::<E>(),
            Self::LoaderNotFound { .. } => None,
        }
    }

    /// Returns `true` for the "no loader registered" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LoaderNotFound { .. })
    }
}

/// Rejection of a current or default locale assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    /// The locale is not part of the registered locale set.
    #[error("locale '{locale}' is not one of the registered locales")]
    UnknownLocale {
        /// The rejected locale.
        locale: String,
    },
}

/// An error raised while resolving a translation path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The path was neither a string nor a map of locale to value.
    #[error("invalid path format: expected a string path or a locale map, found {found}")]
    InvalidPathFormat {
        /// The kind of value that was supplied instead.
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ScopedId;
    use std::fmt;

    #[derive(Debug)]
    struct DiskFull;

    impl fmt::Display for DiskFull {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk full")
        }
    }

    impl StdError for DiskFull {}

    #[test]
    fn test_not_found_names_identity() {
        let err = LoadError::not_found(&ScopedId::new("logo", "images"));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "no loader registered for context 'images' (requested 'images:logo')"
        );
    }

    #[test]
    fn test_loader_error_is_passed_through() {
        let err = LoadError::loader(DiskFull);
        assert_eq!(err.to_string(), "disk full");
        assert!(err.downcast_ref::<DiskFull>().is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_clones_share_the_same_cause() {
        let err = LoadError::loader("boom");
        let copy = err.clone();
        match (&err, &copy) {
            (LoadError::Loader(a), LoadError::Loader(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected loader errors"),
        }
    }
}
