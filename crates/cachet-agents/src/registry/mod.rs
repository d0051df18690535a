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

//! The loader-backed registry: resolves identities to entries, fetching each
//! unique identity at most once at a time and caching it afterwards.
//!
//! A registry owns three things:
//! - the store of already loaded entries,
//! - one loader per context, plus lazy loaders waiting to be materialized,
//! - the in-flight table of loads that have not settled yet.
//!
//! A request is answered from the store when possible, joins the matching
//! in-flight load when there is one, and only otherwise invokes the loader
//! registered for the identity's context. The identity is reserved in the
//! in-flight table before that loader runs, so concurrent first requests
//! join the reservation instead of invoking the loader again.

mod pending;
mod reservation;

pub use pending::{Loaded, PendingLoad};

use cachet_core::{ContextLoader, Entry, Identity, LazyLoader, LoadError, LoadOutcome};
use cachet_data::{EntryStore, IdentityStore};
use cachet_telemetry::{MetricsSnapshot, RegistryMetrics};
use reservation::{Handoff, Reservation};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// A load registered in the in-flight table.
struct InFlight<I: Identity, T> {
    /// Distinguishes this load from a later one for the same identity.
    ticket: u64,
    load: PendingLoad<I, T>,
}

/// Where a registry stands with its lazy loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LazyPhase {
    /// Queued resolvers have not run yet.
    Queued,
    /// The given thread is running the resolvers.
    Materializing(ThreadId),
    /// Every resolver ran; new ones run as soon as they are added.
    Done,
}

struct RegistryState<I: Identity, T> {
    name: String,
    store: Box<dyn IdentityStore<I, T>>,
    loaders: Vec<ContextLoader<I, T>>,
    lazy_loaders: Vec<LazyLoader<I, T>>,
    phase: LazyPhase,
    in_flight: Vec<InFlight<I, T>>,
    next_ticket: u64,
}

impl<I: Identity, T> RegistryState<I, T> {
    fn find_in_flight(&self, id: &I) -> Option<&InFlight<I, T>> {
        self.in_flight.iter().find(|flight| flight.load.id() == id)
    }

    /// Removes the in-flight load for `id` if it is still the one holding
    /// `ticket`. Returns `false` when it was invalidated in the meantime.
    fn take_in_flight(&mut self, id: &I, ticket: u64) -> bool {
        match self
            .in_flight
            .iter()
            .position(|flight| flight.ticket == ticket && flight.load.id() == id)
        {
            Some(index) => {
                self.in_flight.remove(index);
                true
            }
            None => false,
        }
    }

    /// Installs a loader, replacing the one registered for the same context.
    fn install_loader(&mut self, loader: ContextLoader<I, T>) {
        let context = loader.context().to_string();
        match self.loaders.iter().position(|l| l.context() == context) {
            Some(index) => {
                log::debug!("[{}] Replacing loader for context '{context}'.", self.name);
                self.loaders[index] = loader;
            }
            None => {
                log::debug!("[{}] Registering loader for context '{context}'.", self.name);
                self.loaders.push(loader);
            }
        }

        let before = self.in_flight.len();
        self.in_flight
            .retain(|flight| flight.load.id().context() != context);
        let dropped = before - self.in_flight.len();
        if dropped > 0 {
            log::debug!(
                "[{}] Dropped {dropped} in-flight load(s) for reconfigured context '{context}'.",
                self.name
            );
        }
    }

    fn loader_for(&self, context: &str) -> Option<ContextLoader<I, T>> {
        self.loaders
            .iter()
            .find(|loader| loader.context() == context)
            .cloned()
    }
}

/// State shared by every clone of a registry.
struct RegistryInner<I: Identity, T> {
    state: Mutex<RegistryState<I, T>>,
    /// Signalled when lazy loaders finish materializing.
    materialized: Condvar,
}

impl<I: Identity, T> RegistryInner<I, T> {
    fn lock(&self) -> MutexGuard<'_, RegistryState<I, T>> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still safe to use.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks lazy materialization finished even if a resolver panics, so
/// waiting threads are never left blocked.
struct MaterializeGuard<'a, I: Identity, T> {
    inner: &'a RegistryInner<I, T>,
    finished: bool,
}

impl<I: Identity, T> Drop for MaterializeGuard<'_, I, T> {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.inner.lock();
            log::warn!("[{}] A lazy loader panicked while materializing.", state.name);
            state.phase = LazyPhase::Done;
            drop(state);
            self.inner.materialized.notify_all();
        }
    }
}

/// A registry resolving identities of type `I` to payloads of type `T`.
///
/// Cloning a registry is cheap and yields another handle to the same state.
///
/// # Concurrency
///
/// For a given identity the loader runs at most once while a load for it is
/// outstanding, across threads: the first caller reserves the identity
/// before invoking the loader and every caller asking in the meantime
/// receives the same [`PendingLoad`]. Settled loads are removed from the
/// in-flight table whether they succeeded or failed, so a failed identity
/// can be retried. Loaders are never invoked while the registry's lock is
/// held, so they may call back into the registry.
pub struct LoaderRegistry<I: Identity, T> {
    inner: Arc<RegistryInner<I, T>>,
    metrics: Arc<RegistryMetrics>,
}

impl<I: Identity, T> Clone for LoaderRegistry<I, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<I: Identity, T: Send + Sync + 'static> LoaderRegistry<I, T> {
    /// Creates an empty registry backed by an [`EntryStore`].
    ///
    /// `name` labels the registry in log output.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Returns a builder to seed entries and loaders at construction.
    pub fn builder(name: impl Into<String>) -> RegistryBuilder<I, T> {
        RegistryBuilder::new(name)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState<I, T>> {
        self.inner.lock()
    }

    /// The label used in log output.
    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// Reads the registry's counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Checks whether an entry for `id` is cached.
    pub fn exists(&self, id: &I) -> bool {
        self.lock().store.exists(id)
    }

    /// Returns the cached entry for `id`, if any.
    pub fn find_by_id(&self, id: &I) -> Option<Entry<I, T>> {
        self.lock().store.find_by_id(id).cloned()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    /// Whether no entry is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().store.is_empty()
    }

    /// Writes entries into the store, replacing any with the same identity.
    pub fn upsert(&self, entries: Vec<Entry<I, T>>) {
        self.lock().store.upsert(entries);
    }

    /// Substitutes the whole store.
    ///
    /// Loads still in flight settle into the new store.
    pub fn replace_store(&self, store: impl IdentityStore<I, T> + 'static) {
        let mut state = self.lock();
        log::debug!("[{}] Store replaced by host.", state.name);
        state.store = Box::new(store);
    }

    /// Registers `loader` for its context.
    ///
    /// Any loader already serving that context is replaced, and in-flight
    /// loads for the context are dropped from the table: their results still
    /// reach the callers holding them but are not cached, and the next
    /// request triggers a fresh load through the new loader. This holds even
    /// when the replaced loader calls `set_loader` while it is running.
    pub fn set_loader(&self, loader: ContextLoader<I, T>) {
        self.lock().install_loader(loader);
    }

    /// Registers a loader that is only built when first needed.
    ///
    /// Before the registry has resolved any loader, `resolver` is queued and
    /// will run exactly once on the first [`get_loader`](Self::get_loader) or
    /// [`load`](Self::load). Afterwards it runs immediately. A resolver may
    /// itself add lazy loaders; they are materialized in the same pass.
    pub fn add_lazy_loader<F>(&self, resolver: F)
    where
        F: FnOnce() -> ContextLoader<I, T> + Send + 'static,
    {
        let resolver: LazyLoader<I, T> = Box::new(resolver);
        {
            let mut state = self.lock();
            if state.phase != LazyPhase::Done {
                state.lazy_loaders.push(resolver);
                return;
            }
        }
        self.set_loader(resolver());
    }

    /// Materializes pending lazy loaders, once per registry.
    ///
    /// Other threads arriving meanwhile wait until every resolver has run.
    /// The materializing thread itself does not wait, so resolvers may call
    /// back into the registry.
    fn ensure_initialized(&self) {
        let current = thread::current().id();
        let mut state = self.lock();
        loop {
            match state.phase {
                LazyPhase::Done => return,
                LazyPhase::Materializing(owner) if owner == current => return,
                LazyPhase::Materializing(_) => {
                    state = self
                        .inner
                        .materialized
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                LazyPhase::Queued => break,
            }
        }

        state.phase = LazyPhase::Materializing(current);
        let mut guard = MaterializeGuard {
            inner: &self.inner,
            finished: false,
        };
        loop {
            let pending = std::mem::take(&mut state.lazy_loaders);
            if pending.is_empty() {
                break;
            }
            log::debug!("[{}] Materializing {} lazy loader(s).", state.name, pending.len());
            drop(state);
            for resolve in pending {
                let loader = resolve();
                self.lock().install_loader(loader);
            }
            state = self.lock();
        }
        state.phase = LazyPhase::Done;
        guard.finished = true;
        drop(state);
        self.inner.materialized.notify_all();
    }

    /// Whether lazy loaders have been materialized.
    pub fn is_initialized(&self) -> bool {
        self.lock().phase == LazyPhase::Done
    }

    /// Returns the loader serving `context`.
    ///
    /// The first call on a registry materializes its lazy loaders.
    pub fn get_loader(&self, context: &str) -> Option<ContextLoader<I, T>> {
        self.ensure_initialized();
        self.lock().loader_for(context)
    }

    /// Contexts that currently have a loader, in registration order.
    ///
    /// Lazy loaders appear once materialized.
    pub fn contexts(&self) -> Vec<String> {
        self.lock()
            .loaders
            .iter()
            .map(|loader| loader.context().to_string())
            .collect()
    }

    /// Number of loads currently in flight, reservations included.
    pub fn in_flight_len(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Answers `id` from the store or from a load already in flight.
    fn lookup(&self, state: &RegistryState<I, T>, id: &I) -> Option<Loaded<I, T>> {
        if let Some(entry) = state.store.find_by_id(id) {
            self.metrics.record_cache_hit();
            log::trace!("[{}] Cache hit for '{id}'.", state.name);
            return Some(Loaded::Ready(entry.clone()));
        }
        state.find_in_flight(id).map(|flight| {
            self.metrics.record_in_flight_join();
            log::trace!("[{}] Joining in-flight load for '{id}'.", state.name);
            Loaded::Pending(flight.load.clone())
        })
    }

    /// Resolves `id` to its entry.
    ///
    /// 1. A cached entry is returned as [`Loaded::Ready`] without touching
    ///    any loader.
    /// 2. A load already in flight for `id` is shared.
    /// 3. Otherwise `id` is reserved and the loader for its context is
    ///    invoked. A synchronous payload is cached and returned ready; a
    ///    pending one stays in flight and its handle is returned. Callers
    ///    that arrive while the loader runs receive a handle that settles
    ///    with the same result.
    ///
    /// A result produced after its context got a new loader reaches the
    /// callers holding it but is not cached.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::LoaderNotFound`] when no loader serves the
    /// context, or the loader's own error if it fails synchronously.
    pub fn load(&self, id: &I) -> Result<Loaded<I, T>, LoadError> {
        if let Some(loaded) = self.lookup(&self.lock(), id) {
            return Ok(loaded);
        }
        self.ensure_initialized();

        let (loader, reservation) = {
            let mut state = self.lock();
            // The lock was released above; another caller may have won.
            if let Some(loaded) = self.lookup(&state, id) {
                return Ok(loaded);
            }
            let loader = state.loader_for(id.context()).ok_or_else(|| {
                log::debug!("[{}] No loader for context '{}'.", state.name, id.context());
                LoadError::not_found(id)
            })?;
            let reservation = Reservation::reserve(&self.inner, &mut state, &self.metrics, id.clone());
            (loader, reservation)
        };

        self.metrics.record_loader_invocation();
        match loader.load(id) {
            Ok(LoadOutcome::Immediate(payload)) => {
                let entry = Entry::new(id.clone(), payload);
                {
                    let mut state = self.lock();
                    if state.take_in_flight(id, reservation.ticket()) {
                        state.store.upsert(vec![entry.clone()]);
                    } else {
                        self.metrics.record_stale_discard();
                        log::warn!(
                            "[{}] Not caching '{id}': its context was reconfigured while loading.",
                            state.name
                        );
                    }
                }
                reservation.complete(Handoff::Settled(Ok(entry.clone())));
                Ok(Loaded::Ready(entry))
            }
            Ok(LoadOutcome::Pending(future)) => {
                let load = reservation.load().clone();
                log::debug!("[{}] Load for '{id}' is in flight.", self.name());
                reservation.complete(Handoff::Follow(future));
                Ok(Loaded::Pending(load))
            }
            Err(err) => {
                self.metrics.record_load_failure();
                self.lock().take_in_flight(id, reservation.ticket());
                reservation.complete(Handoff::Settled(Err(err.clone())));
                Err(err)
            }
        }
    }
}

/// Builder seeding a [`LoaderRegistry`] with entries and loaders.
pub struct RegistryBuilder<I: Identity, T> {
    name: String,
    store: Option<Box<dyn IdentityStore<I, T>>>,
    entries: Vec<Entry<I, T>>,
    loaders: Vec<ContextLoader<I, T>>,
    lazy_loaders: Vec<LazyLoader<I, T>>,
}

impl<I: Identity, T: Send + Sync + 'static> RegistryBuilder<I, T> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: None,
            entries: Vec::new(),
            loaders: Vec::new(),
            lazy_loaders: Vec::new(),
        }
    }

    /// Uses a host-provided store instead of the default [`EntryStore`].
    pub fn store(mut self, store: impl IdentityStore<I, T> + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Seeds one entry.
    pub fn entry(mut self, entry: Entry<I, T>) -> Self {
        self.entries.push(entry);
        self
    }

    /// Seeds several entries.
    pub fn entries(mut self, entries: impl IntoIterator<Item = Entry<I, T>>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Registers a loader.
    pub fn loader(mut self, loader: ContextLoader<I, T>) -> Self {
        self.loaders.push(loader);
        self
    }

    /// Queues a lazy loader.
    pub fn lazy_loader<F>(mut self, resolver: F) -> Self
    where
        F: FnOnce() -> ContextLoader<I, T> + Send + 'static,
    {
        self.lazy_loaders.push(Box::new(resolver));
        self
    }

    /// Builds the registry.
    pub fn build(self) -> LoaderRegistry<I, T> {
        let mut store = self
            .store
            .unwrap_or_else(|| Box::new(EntryStore::<I, T>::new()));
        store.upsert(self.entries);

        let mut state = RegistryState {
            name: self.name,
            store,
            loaders: Vec::new(),
            lazy_loaders: self.lazy_loaders,
            phase: LazyPhase::Queued,
            in_flight: Vec::new(),
            next_ticket: 0,
        };
        for loader in self.loaders {
            state.install_loader(loader);
        }

        LoaderRegistry {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(state),
                materialized: Condvar::new(),
            }),
            metrics: Arc::new(RegistryMetrics::new()),
        }
    }
}
