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

//! Counters describing how a registry served its requests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A collection of counters kept by one registry.
///
/// Counters are lock-free and only ever grow; a registry shares its set
/// behind an `Arc` so clones of the registry report into the same counters.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    cache_hits: AtomicU64,
    in_flight_joins: AtomicU64,
    loader_invocations: AtomicU64,
    load_failures: AtomicU64,
    stale_discards: AtomicU64,
}

/// A point-in-time copy of [`RegistryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Requests answered straight from the store.
    pub cache_hits: u64,
    /// Requests that joined a load already in flight.
    pub in_flight_joins: u64,
    /// Times an underlying loader was called.
    pub loader_invocations: u64,
    /// Loads that ended in an error.
    pub load_failures: u64,
    /// Loads that settled after their context got a new loader.
    pub stale_discards: u64,
}

impl RegistryMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request answered from the store.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a request that joined an in-flight load.
    pub fn record_in_flight_join(&self) {
        self.in_flight_joins.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a call into a loader.
    pub fn record_loader_invocation(&self) {
        self.loader_invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed load.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a load whose result was not cached because it went stale.
    pub fn record_stale_discard(&self) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            in_flight_joins: self.in_flight_joins.load(Ordering::Relaxed),
            loader_invocations: self.loader_invocations.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
        }
    }
}
