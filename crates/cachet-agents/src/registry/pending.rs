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

//! Handles returned by [`LoaderRegistry::load`](super::LoaderRegistry::load).

use cachet_core::{Entry, Identity, LoadError};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub(crate) type SharedLoad<I, T> = Shared<BoxFuture<'static, Result<Entry<I, T>, LoadError>>>;

/// A load that has not settled yet.
///
/// Every clone observes the same eventual result, and the underlying loader
/// runs once no matter how many clones are awaited. The load makes progress
/// when a clone is polled.
pub struct PendingLoad<I: Identity, T> {
    id: I,
    inner: SharedLoad<I, T>,
}

impl<I: Identity, T> PendingLoad<I, T> {
    pub(crate) fn new(id: I, inner: SharedLoad<I, T>) -> Self {
        Self { id, inner }
    }

    /// The identity being loaded.
    pub fn id(&self) -> &I {
        &self.id
    }

    /// The result, if the load has already settled.
    pub fn peek(&self) -> Option<Result<Entry<I, T>, LoadError>> {
        self.inner.peek().cloned()
    }

    /// Returns `true` if both handles drive the same load.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<I: Identity, T> Clone for PendingLoad<I, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: self.inner.clone(),
        }
    }
}

// The identity is never pinned; only the shared future is polled.
impl<I: Identity, T> Unpin for PendingLoad<I, T> {}

impl<I: Identity, T> Future for PendingLoad<I, T> {
    type Output = Result<Entry<I, T>, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<I: Identity, T> fmt::Debug for PendingLoad<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad").field("id", &self.id).finish_non_exhaustive()
    }
}

/// The answer to a load request: the entry itself, or a handle to await it.
pub enum Loaded<I: Identity, T> {
    /// The entry was cached or produced synchronously.
    Ready(Entry<I, T>),
    /// The entry is being fetched.
    Pending(PendingLoad<I, T>),
}

impl<I: Identity, T> Loaded<I, T> {
    /// Waits for the entry regardless of which arm this is.
    pub async fn resolve(self) -> Result<Entry<I, T>, LoadError> {
        match self {
            Self::Ready(entry) => Ok(entry),
            Self::Pending(pending) => pending.await,
        }
    }

    /// Returns `true` if the entry is available without waiting.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The entry, if it is available without waiting.
    pub fn ready(self) -> Option<Entry<I, T>> {
        match self {
            Self::Ready(entry) => Some(entry),
            Self::Pending(_) => None,
        }
    }

    /// The pending handle, if the entry is still being fetched.
    pub fn pending(self) -> Option<PendingLoad<I, T>> {
        match self {
            Self::Ready(_) => None,
            Self::Pending(pending) => Some(pending),
        }
    }
}

impl<I: Identity, T: fmt::Debug> fmt::Debug for Loaded<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(entry) => f.debug_tuple("Ready").field(entry).finish(),
            Self::Pending(pending) => f.debug_tuple("Pending").field(pending).finish(),
        }
    }
}
