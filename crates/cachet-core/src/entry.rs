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

//! Immutable cache entries.

use crate::identity::Identity;
use std::{ops::Deref, sync::Arc};

/// An immutable cache entry: an identity paired with a shared payload.
///
/// The payload is reference-counted, so cloning an entry is cheap and never
/// duplicates the underlying data. The payload type is opaque to the cache:
/// a module body, resource data, a config object, or a translation map.
#[derive(Debug)]
pub struct Entry<I: Identity, T> {
    id: I,
    payload: Arc<T>,
}

impl<I: Identity, T> Entry<I, T> {
    /// Creates a new entry that takes ownership of the payload.
    pub fn new(id: I, payload: T) -> Self {
        Self {
            id,
            payload: Arc::new(payload),
        }
    }

    /// Creates an entry around an already shared payload.
    pub fn from_shared(id: I, payload: Arc<T>) -> Self {
        Self { id, payload }
    }

    /// The identity this entry is stored under.
    pub fn id(&self) -> &I {
        &self.id
    }

    /// The payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// A new shared reference to the payload.
    pub fn shared_payload(&self) -> Arc<T> {
        Arc::clone(&self.payload)
    }
}

impl<I: Identity, T> Clone for Entry<I, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<I: Identity, T> Deref for Entry<I, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}
