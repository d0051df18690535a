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

//! An ordered, identity-keyed storage for loaded entries.

use cachet_core::{Entry, Identity};

/// The storage contract a registry caches into.
///
/// This is the extension point for hosts that substitute their own store.
/// Implementations must keep identities unique and replace matching entries
/// in place.
pub trait IdentityStore<I: Identity, T>: Send {
    /// Inserts or replaces entries, processed in input order.
    fn upsert(&mut self, entries: Vec<Entry<I, T>>);

    /// Finds the entry stored under `id`.
    fn find_by_id(&self, id: &I) -> Option<&Entry<I, T>>;

    /// Checks whether an entry is stored under `id`.
    fn exists(&self, id: &I) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The default in-memory store.
///
/// Entries keep insertion order. An entry whose identity already exists
/// replaces the old one at its original position, so no two entries ever
/// share an identity. Lookups are linear scans, which is fine for the small
/// collections a registry holds; a map index could be layered on top without
/// changing observable order.
pub struct EntryStore<I: Identity, T> {
    entries: Vec<Entry<I, T>>,
}

impl<I: Identity, T> Default for EntryStore<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Identity, T> Clone for EntryStore<I, T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<I: Identity, T> EntryStore<I, T> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a store pre-seeded with entries.
    ///
    /// Seeds go through the same upsert rule, so duplicate identities in
    /// `entries` collapse to the last one, at the first one's position.
    pub fn with_entries(entries: Vec<Entry<I, T>>) -> Self
    where
        T: Send + Sync,
    {
        let mut store = Self::new();
        store.upsert(entries);
        store
    }

    /// Iterates over entries in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<I, T>> {
        self.entries.iter()
    }

    fn position(&self, id: &I) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }
}

impl<I: Identity, T: Send + Sync> IdentityStore<I, T> for EntryStore<I, T> {
    fn upsert(&mut self, entries: Vec<Entry<I, T>>) {
        for entry in entries {
            match self.position(entry.id()) {
                Some(index) => {
                    log::trace!("Replacing entry '{}' at position {index}.", entry.id());
                    self.entries[index] = entry;
                }
                None => self.entries.push(entry),
            }
        }
    }

    fn find_by_id(&self, id: &I) -> Option<&Entry<I, T>> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::ScopedId;

    fn entry(key: &str, context: &str, payload: &str) -> Entry<ScopedId, String> {
        Entry::new(ScopedId::new(key, context), payload.to_string())
    }

    fn keys(store: &EntryStore<ScopedId, String>) -> Vec<String> {
        store.iter().map(|e| e.payload().clone()).collect()
    }

    #[test]
    fn test_upsert_appends_in_input_order() {
        let mut store = EntryStore::new();
        store.upsert(vec![entry("a", "ctx", "1"), entry("b", "ctx", "2")]);
        store.upsert(vec![entry("c", "ctx", "3")]);
        assert_eq!(keys(&store), vec!["1", "2", "3"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = EntryStore::new();
        store.upsert(vec![entry("a", "ctx", "1"), entry("b", "ctx", "2"), entry("c", "ctx", "3")]);
        store.upsert(vec![entry("b", "ctx", "updated")]);
        assert_eq!(keys(&store), vec!["1", "updated", "3"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_duplicates_within_one_call_collapse() {
        let store = EntryStore::with_entries(vec![
            entry("a", "ctx", "first"),
            entry("b", "ctx", "other"),
            entry("a", "ctx", "second"),
        ]);
        assert_eq!(keys(&store), vec!["second", "other"]);
    }

    #[test]
    fn test_find_and_exists() {
        let store = EntryStore::with_entries(vec![entry("a", "ctx", "1")]);
        let separately_built = ScopedId::new("a", "ctx");
        assert!(store.exists(&separately_built));
        assert_eq!(store.find_by_id(&separately_built).unwrap().payload(), "1");
        assert!(!store.exists(&ScopedId::new("a", "other")));
        assert!(store.find_by_id(&ScopedId::new("z", "ctx")).is_none());
    }

    #[test]
    fn test_empty_store() {
        let mut store: EntryStore<ScopedId, String> = EntryStore::default();
        assert!(store.is_empty());
        store.upsert(Vec::new());
        assert!(store.is_empty());
    }
}
