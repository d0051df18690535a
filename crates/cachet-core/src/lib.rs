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

//! # Cachet Core
//!
//! Foundational crate containing the identities, entries, loader contracts,
//! and error kinds shared by every cache layer.
//!
//! It has no knowledge of how entries are stored or how loads are
//! deduplicated; those live in `cachet-data` and `cachet-agents`.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod identity;
pub mod loader;

pub use entry::Entry;
pub use error::{LoadError, LocaleError, SharedError, TranslateError};
pub use identity::{Identity, LocalizedId, ScopedId};
pub use loader::{ContextLoader, LazyLoader, LoadOutcome, Loader, PendingPayload};
