// ── Reactive collection streams ──
//
// Subscription types for consuming collection state from the Aggregator.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::state::CollectionState;

/// A subscription to one collection's state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via `changed()` or by converting to a `Stream`.
pub struct StateStream<T: Send + Sync + 'static> {
    current: CollectionState<T>,
    receiver: watch::Receiver<CollectionState<T>>,
}

impl<T: Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<CollectionState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &CollectionState<T> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> CollectionState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the aggregator has been dropped.
    pub async fn changed(&mut self) -> Option<CollectionState<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then a new snapshot on every change.
pub struct StateWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<CollectionState<T>>,
}

impl<T: Send + Sync + 'static> Stream for StateWatchStream<T> {
    type Item = CollectionState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
