//! Observable request state for asynchronous fetches.
//!
//! # Overview
//! `Query<T>` wraps a fetch source (any `Fn() -> Future<Output = Result<T, E>>`)
//! and exposes its lifecycle as `{data, loading, error}` with `refetch`,
//! `cancel`, and observer registration. UI layers bind to it through
//! `subscribe` without the adapter knowing anything about their reactivity.
//!
//! # Design
//! - Cancellation is an advisory `CancellationToken`; once set, no further
//!   state mutation is applied.
//! - The HTTP side keeps the host-does-IO split: `ApiClient` builds and
//!   parses plain-data requests, a host `Transport` executes them, and
//!   `HttpFetcher` combines the two into fetch sources for `Query`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod observer;
pub mod query;
pub mod state;
pub mod types;

pub use cancel::CancellationToken;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use fetch::{HttpFetcher, Transport};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use observer::{Observers, SubscriptionId};
pub use query::Query;
pub use state::{QueryState, Status};
pub use types::{CreateUser, User};
