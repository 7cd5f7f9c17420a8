//! Request/state adapter.
//!
//! # Design
//! A `Query<T>` wraps one fetch source and exposes its lifecycle as a
//! `QueryState<T>` snapshot plus change notifications:
//!
//! - `start` flips `loading` on synchronously, then returns a future that
//!   awaits the fetch and records either `data` or `error`.
//! - `cancel` sets a `CancellationToken` that every state mutation checks
//!   under the state lock. After it, the state is frozen as it was.
//! - Mutation and observer delivery happen under one reentrant emission
//!   lock, which `cancel` also takes. Observers therefore see snapshots in
//!   mutation order, and none is delivered once `cancel` has returned.
//! - `refetch` is `start` again with the same fetch source. Cancellation is
//!   not reset.
//!
//! Overlapping fetches are neither de-duplicated nor serialized: whichever
//! resolves last writes the state. Cancellation never aborts the fetch
//! itself, it only suppresses the writes.
//!
//! Fetch errors are reduced to their `Display` text and stored; they are
//! never returned to the caller.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::{Mutex, ReentrantMutex};

use crate::cancel::CancellationToken;
use crate::observer::{Observers, SubscriptionId};
use crate::state::QueryState;

type FetchFn<T> = dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync;

pub struct Query<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    fetch: Box<FetchFn<T>>,
    state: Mutex<QueryState<T>>,
    observers: Observers<QueryState<T>>,
    token: CancellationToken,
    /// Held across mutate-then-notify and by `cancel`. Reentrant so an
    /// observer may call back into the query.
    emit: ReentrantMutex<()>,
    fetches: AtomicU64,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Query<T>
where
    T: Clone + Send + 'static,
{
    /// Build an idle query. Nothing is fetched until `start` is called.
    pub fn new<F, Fut, E>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + 'static,
    {
        Self::with_token(fetch, CancellationToken::new())
    }

    /// Build an idle query guarded by an existing token, so several queries
    /// can be torn down together.
    pub fn with_token<F, Fut, E>(fetch: F, token: CancellationToken) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + 'static,
    {
        let fetch = move || fetch().map(|outcome| outcome.map_err(|e| e.to_string())).boxed();
        Self {
            inner: Arc::new(Inner {
                fetch: Box::new(fetch),
                state: Mutex::new(QueryState::idle()),
                observers: Observers::new(),
                token,
                emit: ReentrantMutex::new(()),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    /// Build a query and start it right away on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F, Fut, E>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + 'static,
    {
        let query = Self::new(fetch);
        tokio::spawn(query.start());
        query
    }

    /// Invoke the fetch source and mark the query as loading.
    ///
    /// The returned future must be polled (awaited or spawned) for the
    /// result to be recorded.
    pub fn start(&self) -> impl Future<Output = ()> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let seq = inner.fetches.fetch_add(1, Ordering::Relaxed) + 1;
        let pending = (inner.fetch)();
        if inner.apply(QueryState::begin) {
            tracing::debug!(seq, "fetch started");
        }
        async move {
            match pending.await {
                Ok(value) => {
                    if inner.apply(|state| state.resolve(value)) {
                        tracing::debug!(seq, "fetch resolved");
                    }
                }
                Err(message) => {
                    tracing::debug!(seq, error = %message, "fetch failed");
                    inner.apply(|state| state.reject(message));
                }
            }
        }
    }

    /// Run the captured fetch source again, exactly like `start`.
    ///
    /// Cancellation is not reset: after `cancel` the fetch still runs but its
    /// outcome is discarded. Overlapping fetches are not de-duplicated.
    pub fn refetch(&self) -> impl Future<Output = ()> + Send + 'static {
        tracing::trace!("refetch requested");
        self.start()
    }

    /// Freeze the state. Idempotent, and harmless after completion.
    ///
    /// Waits for any in-progress observer delivery to finish; once this
    /// returns no observer is called again.
    pub fn cancel(&self) {
        let _emit = self.inner.emit.lock();
        let _state = self.inner.state.lock();
        if self.inner.token.cancel() {
            tracing::debug!("query cancelled");
        }
    }

    /// Whether `cancel` (or a shared token) has fired.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// The token guarding this query. Cancelling a clone freezes the state
    /// and stops delivery to the remaining observers, but unlike `cancel` it
    /// does not wait for a callback that is already running.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<T> {
        self.inner.state.lock().clone()
    }

    /// Register `observer`; it receives a snapshot after every applied
    /// mutation. Suppressed mutations are not reported.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&QueryState<T>) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(observer)
    }

    /// Returns `true` if `id` was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }
}

impl<T: Clone> Inner<T> {
    /// Apply `mutate` unless cancelled, then notify observers with the new
    /// snapshot. Returns whether the mutation was applied.
    fn apply(&self, mutate: impl FnOnce(&mut QueryState<T>)) -> bool {
        let _emit = self.emit.lock();
        let snapshot = {
            let mut state = self.state.lock();
            if self.token.is_cancelled() {
                tracing::trace!("query cancelled, state mutation suppressed");
                return false;
            }
            mutate(&mut state);
            state.clone()
        };
        self.observers.notify_while(&snapshot, || !self.token.is_cancelled());
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("state", &*self.inner.state.lock())
            .field("cancelled", &self.inner.token.is_cancelled())
            .field("observers", &self.inner.observers)
            .finish()
    }
}
