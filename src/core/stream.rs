//! Observable filter sets
//!
//! Every filter set the service reads or writes is published to two places:
//!
//! ```text
//!                          ┌──▶ keyed channel "process-filters-app-A-alice" ──▶ subscribers of app A
//! FilterStreams::publish ──┤
//!                          └──▶ shared channel ──▶ subscribers of "whatever app was addressed last"
//! ```
//!
//! Both are `tokio::sync::watch` channels: a new subscriber sees the latest
//! value straight away, then every later one. The shared channel is
//! last-write-wins across applications; two loads for different apps race
//! on it and the one that completes last is what its subscribers see. Keyed
//! channels are created on first access and live as long as the registry.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::FilterDefinition;
use futures::Stream;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

type Snapshot = Vec<FilterDefinition>;

/// Registry of per-key filter channels plus the shared channel
#[derive(Debug)]
pub struct FilterStreams {
    shared: watch::Sender<Snapshot>,
    keyed: RwLock<HashMap<String, watch::Sender<Snapshot>>>,
}

impl FilterStreams {
    pub fn new() -> Self {
        let (shared, _) = watch::channel(Vec::new());
        Self {
            shared,
            keyed: RwLock::new(HashMap::new()),
        }
    }

    /// Publish a filter set for a key, on its channel and the shared one
    ///
    /// Never fails: a channel with no subscribers still keeps the value.
    pub fn publish(&self, key: &str, filters: &[FilterDefinition]) {
        tracing::debug!(key = %key, count = filters.len(), "Publishing filter set");
        self.sender(key).send_replace(filters.to_vec());
        self.shared.send_replace(filters.to_vec());
    }

    /// Subscribe to the channel of one key
    pub fn subscribe(&self, key: &str) -> FilterSubscription {
        FilterSubscription::new(self.sender(key).subscribe())
    }

    /// Subscribe to the shared channel
    pub fn subscribe_shared(&self) -> FilterSubscription {
        FilterSubscription::new(self.shared.subscribe())
    }

    /// Latest value published for a key, empty if nothing was published yet
    pub fn latest(&self, key: &str) -> Snapshot {
        self.sender(key).borrow().clone()
    }

    /// Latest value published on the shared channel
    pub fn latest_shared(&self) -> Snapshot {
        self.shared.borrow().clone()
    }

    /// Number of keys with a channel
    pub fn key_count(&self) -> usize {
        self.keyed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn sender(&self, key: &str) -> watch::Sender<Snapshot> {
        if let Some(sender) = self
            .keyed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return sender.clone();
        }

        let mut keyed = self.keyed.write().unwrap_or_else(PoisonError::into_inner);
        keyed
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(Vec::new()).0)
            .clone()
    }
}

impl Default for FilterStreams {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber's view of a filter channel
///
/// When returned by `get_filters`, the first item is the outcome of the
/// background load: the loaded set, or the load's error after which the
/// subscription ends. A newer value published meanwhile follows as the next
/// item. Otherwise the first item is the channel's current value.
#[derive(Debug)]
pub struct FilterSubscription {
    receiver: watch::Receiver<Snapshot>,
    pending: Option<JoinHandle<FilterResult<Snapshot>>>,
    finished: bool,
}

impl FilterSubscription {
    fn new(mut receiver: watch::Receiver<Snapshot>) -> Self {
        receiver.mark_changed();
        Self {
            receiver,
            pending: None,
            finished: false,
        }
    }

    /// Attach a background load whose outcome is delivered first
    pub(crate) fn with_pending(mut self, load: JoinHandle<FilterResult<Snapshot>>) -> Self {
        self.pending = Some(load);
        self
    }

    /// The channel's current value, without waiting
    pub fn current(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next item
    ///
    /// Returns `None` once the subscription has ended, either after an error
    /// or because the channel was dropped.
    pub async fn next(&mut self) -> Option<FilterResult<Snapshot>> {
        if self.finished {
            return None;
        }

        if let Some(load) = self.pending.take() {
            let outcome = load
                .await
                .unwrap_or_else(|e| Err(FilterError::Internal(format!("filter load task failed: {}", e))));
            return match outcome {
                Ok(loaded) => {
                    if *self.receiver.borrow_and_update() != loaded {
                        self.receiver.mark_changed();
                    }
                    Some(Ok(loaded))
                }
                Err(e) => {
                    self.finished = true;
                    Some(Err(e))
                }
            };
        }

        match self.receiver.changed().await {
            Ok(()) => Some(Ok(self.receiver.borrow_and_update().clone())),
            Err(_) => {
                self.finished = true;
                None
            }
        }
    }

    /// Turn the subscription into a `Stream` of items
    pub fn into_stream(self) -> impl Stream<Item = FilterResult<Snapshot>> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|item| (item, subscription))
        })
    }

    /// Raw snapshots of the channel, current value first, ignoring any pending load
    pub fn updates(&self) -> WatchStream<Snapshot> {
        WatchStream::new(self.receiver.clone())
    }
}
