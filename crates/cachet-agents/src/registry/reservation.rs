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

//! Reservations: the in-flight slot a caller takes before invoking a loader.
//!
//! The slot already holds the [`PendingLoad`] every other caller joins. Its
//! future waits for the reserving caller to hand over what the loader
//! returned, then settles like any other pending load.

use super::{InFlight, PendingLoad, RegistryInner, RegistryState};
use cachet_core::{Entry, Identity, LoadError, PendingPayload};
use cachet_telemetry::RegistryMetrics;
use futures::channel::oneshot;
use futures::FutureExt;
use std::sync::{Arc, Weak};

/// What the reserving caller passes on once its loader has returned.
pub(super) enum Handoff<I: Identity, T> {
    /// The outcome is final and the table was already updated.
    Settled(Result<Entry<I, T>, LoadError>),
    /// The payload is still pending and settles into the registry.
    Follow(PendingPayload<T>),
}

/// An identity reserved in the in-flight table.
///
/// Dropping a reservation that was never completed (the loader panicked)
/// frees the slot, and joined callers observe a loader error.
pub(super) struct Reservation<I: Identity, T> {
    inner: Weak<RegistryInner<I, T>>,
    ticket: u64,
    load: PendingLoad<I, T>,
    sender: Option<oneshot::Sender<Handoff<I, T>>>,
}

impl<I: Identity, T: Send + Sync + 'static> Reservation<I, T> {
    /// Registers `id` in flight under a fresh ticket.
    pub(super) fn reserve(
        inner: &Arc<RegistryInner<I, T>>,
        state: &mut RegistryState<I, T>,
        metrics: &Arc<RegistryMetrics>,
        id: I,
    ) -> Self {
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        let (sender, receiver) = oneshot::channel::<Handoff<I, T>>();
        let registry = Arc::downgrade(inner);
        let metrics = Arc::clone(metrics);
        let settled_id = id.clone();
        let shared = async move {
            let future = match receiver.await {
                Ok(Handoff::Settled(result)) => return result,
                Ok(Handoff::Follow(future)) => future,
                Err(oneshot::Canceled) => {
                    return Err(LoadError::loader(format!(
                        "the loader for '{settled_id}' stopped before producing a result"
                    )));
                }
            };

            let result = future
                .await
                .map(|payload| Entry::new(settled_id.clone(), payload));
            if result.is_err() {
                metrics.record_load_failure();
            }

            if let Some(inner) = registry.upgrade() {
                let mut state = inner.lock();
                if state.take_in_flight(&settled_id, ticket) {
                    if let Ok(entry) = &result {
                        state.store.upsert(vec![entry.clone()]);
                    }
                    log::debug!("[{}] Load for '{settled_id}' settled.", state.name);
                } else {
                    metrics.record_stale_discard();
                    log::warn!(
                        "[{}] Discarding stale load for '{settled_id}': its context was reconfigured.",
                        state.name
                    );
                }
            }
            result
        }
        .boxed()
        .shared();

        let load = PendingLoad::new(id, shared);
        state.in_flight.push(InFlight {
            ticket,
            load: load.clone(),
        });
        Self {
            inner: Arc::downgrade(inner),
            ticket,
            load,
            sender: Some(sender),
        }
    }

    pub(super) fn ticket(&self) -> u64 {
        self.ticket
    }

    /// The handle joined callers share.
    pub(super) fn load(&self) -> &PendingLoad<I, T> {
        &self.load
    }

    /// Hands the loader's result to every joined caller.
    pub(super) fn complete(mut self, handoff: Handoff<I, T>) {
        if let Some(sender) = self.sender.take() {
            // Fails only when every handle is gone, and then nobody is waiting.
            let _ = sender.send(handoff);
        }
    }
}

impl<I: Identity, T> Drop for Reservation<I, T> {
    fn drop(&mut self) {
        if self.sender.is_none() {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().take_in_flight(self.load.id(), self.ticket);
        }
    }
}
