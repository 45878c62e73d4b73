//! Bounded fan-out over independent work items.

use std::future::Future;

use futures::{StreamExt, stream};

/// Default cap on concurrent workers per batch call.
///
/// Bounds outbound connection pressure against the remote service
/// regardless of batch size.
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Run `worker_fn` over every item with at most
/// `min(max_workers, items.len())` units in flight.
///
/// Results are collected in completion order, one per item; a worker's
/// outcome never cancels its siblings, so `worker_fn` should catch its
/// own domain errors and return them as part of `R`. The call returns
/// once every unit has finished.
pub async fn run_bounded<T, R, F, Fut>(items: Vec<T>, max_workers: usize, worker_fn: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    if items.is_empty() {
        return Vec::new();
    }

    // Never more workers than there is work; a zero cap degenerates to
    // serial execution rather than a panic.
    let cap = max_workers.clamp(1, items.len());

    stream::iter(items.into_iter().map(worker_fn))
        .buffer_unordered(cap)
        .collect()
        .await
}
