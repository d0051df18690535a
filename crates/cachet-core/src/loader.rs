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

//! The loader contract: how payloads are produced for identities.
//!
//! A loader is scoped to one context and may answer synchronously or hand
//! back a pending computation. The two cases are an explicit
//! [`LoadOutcome`] rather than something probed at runtime, so every caller
//! branches exhaustively.

use crate::error::LoadError;
use crate::identity::Identity;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A boxed, sendable pending payload.
pub type PendingPayload<T> = futures::future::BoxFuture<'static, Result<T, LoadError>>;

/// What a loader produced for a single invocation.
pub enum LoadOutcome<T> {
    /// The payload is available right away.
    Immediate(T),
    /// The payload will be available once the future settles.
    Pending(PendingPayload<T>),
}

impl<T: Send + 'static> LoadOutcome<T> {
    /// Wraps a future into a pending outcome.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }

    /// Transforms the payload, now or once it settles.
    pub fn map<U, F>(self, f: F) -> LoadOutcome<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Self::Immediate(payload) => LoadOutcome::Immediate(f(payload)),
            Self::Pending(future) => LoadOutcome::Pending(future.map(|r| r.map(f)).boxed()),
        }
    }

    /// Waits for the payload regardless of which arm it is in.
    pub async fn settle(self) -> Result<T, LoadError> {
        match self {
            Self::Immediate(payload) => Ok(payload),
            Self::Pending(future) => future.await,
        }
    }

    /// Returns `true` if the payload is already available.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for LoadOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(payload) => f.debug_tuple("Immediate").field(payload).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A type that can produce the payload for an identity.
///
/// Implementors may perform any I/O they like; it is opaque to the cache.
/// A synchronous failure is returned as `Err`, an asynchronous one as the
/// error output of the pending future. Both are passed to the caller as-is.
pub trait Loader<I: Identity, T>: Send + Sync {
    /// Produces the payload for `id`.
    fn load(&self, id: &I) -> Result<LoadOutcome<T>, LoadError>;
}

impl<I, T, F> Loader<I, T> for F
where
    I: Identity,
    F: Fn(&I) -> Result<LoadOutcome<T>, LoadError> + Send + Sync,
{
    fn load(&self, id: &I) -> Result<LoadOutcome<T>, LoadError> {
        self(id)
    }
}

/// A loader bound to the context it serves.
///
/// At most one is registered per context; registering another for the same
/// context replaces it.
pub struct ContextLoader<I: Identity, T> {
    context: String,
    loader: Arc<dyn Loader<I, T>>,
}

impl<I: Identity, T> ContextLoader<I, T> {
    /// Binds a loader to a context.
    pub fn new(context: impl Into<String>, loader: impl Loader<I, T> + 'static) -> Self {
        Self {
            context: context.into(),
            loader: Arc::new(loader),
        }
    }

    /// Binds a closure to a context.
    ///
    /// Equivalent to [`ContextLoader::new`], but lets the compiler infer the
    /// closure's argument type.
    pub fn from_fn<F>(context: impl Into<String>, f: F) -> Self
    where
        F: Fn(&I) -> Result<LoadOutcome<T>, LoadError> + Send + Sync + 'static,
    {
        Self::new(context, f)
    }

    /// Binds an already shared loader to a context.
    pub fn from_shared(context: impl Into<String>, loader: Arc<dyn Loader<I, T>>) -> Self {
        Self {
            context: context.into(),
            loader,
        }
    }

    /// The context this loader serves.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The underlying loader.
    pub fn loader(&self) -> &Arc<dyn Loader<I, T>> {
        &self.loader
    }

    /// Invokes the loader for `id`.
    pub fn load(&self, id: &I) -> Result<LoadOutcome<T>, LoadError> {
        self.loader.load(id)
    }
}

impl<I: Identity, T> Clone for ContextLoader<I, T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<I: Identity, T> fmt::Debug for ContextLoader<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextLoader")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// A deferred loader: materialized exactly once, the first time a registry
/// needs any loader.
pub type LazyLoader<I, T> = Box<dyn FnOnce() -> ContextLoader<I, T> + Send>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ScopedId;

    fn echo_loader() -> ContextLoader<ScopedId, String> {
        ContextLoader::from_fn("echo", |id: &ScopedId| {
            Ok(LoadOutcome::Immediate(id.key().to_uppercase()))
        })
    }

    #[test]
    fn test_context_loader_invokes_closure() {
        let loader = echo_loader();
        assert_eq!(loader.context(), "echo");
        match loader.load(&ScopedId::new("abc", "echo")) {
            Ok(LoadOutcome::Immediate(value)) => assert_eq!(value, "ABC"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_clone_shares_loader() {
        let loader = echo_loader();
        let copy = loader.clone();
        assert!(Arc::ptr_eq(loader.loader(), copy.loader()));
    }

    #[tokio::test]
    async fn test_map_applies_to_pending_payload() {
        let outcome: LoadOutcome<u32> = LoadOutcome::pending(async { Ok(20) });
        assert!(!outcome.is_immediate());
        let doubled = outcome.map(|v| v * 2);
        assert_eq!(doubled.settle().await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_settle_immediate() {
        let outcome = LoadOutcome::Immediate("ready");
        assert!(outcome.is_immediate());
        assert_eq!(outcome.settle().await.unwrap(), "ready");
    }
}
