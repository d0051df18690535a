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

//! # Cachet Agents
//!
//! The active layer of the cache: registries that decide when loaders run,
//! share loads already in flight, and keep what they produce.
//!
//! [`LoaderRegistry`] is generic over the identity and payload it serves.
//! [`TranslationRegistry`] specializes it for locale-aware translation units
//! and hands out [`Translator`]s that resolve paths against them.

#![warn(missing_docs)]

pub mod registry;
pub mod translation;

pub use registry::{Loaded, LoaderRegistry, PendingLoad, RegistryBuilder};
pub use translation::{
    substitute, LocaleSettings, TranslationLoader, TranslationPath, TranslationRegistry,
    Translator,
};
