//! Observable state of a single query.

use serde::Serialize;

/// Snapshot of a query: the last value, whether a fetch is in flight, and
/// the last error message.
///
/// After a completed fetch exactly one of `data` and `error` is set. Both are
/// `None` only before the first fetch has resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Single-discriminant view of a `QueryState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Success,
    Failed,
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }

    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if self.error.is_some() {
            Status::Failed
        } else if self.data.is_some() {
            Status::Success
        } else {
            Status::Idle
        }
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn resolve(&mut self, value: T) {
        self.data = Some(value);
        self.error = None;
        self.loading = false;
    }

    pub(crate) fn reject(&mut self, message: String) {
        self.data = None;
        self.error = Some(message);
        self.loading = false;
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}
