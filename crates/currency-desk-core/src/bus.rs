// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Options broadcast
//
// One bus per process, created by the composition root and handed to every
// SettingsStore. Each subscriber owns an unbounded channel, so values are
// delivered in order and never coalesced or dropped.

use crate::types::Options;
use async_channel::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};

struct BusInner {
    subscribers: Mutex<Vec<Sender<Options>>>,
    // Serializes read-modify-write-publish across stores sharing this bus
    write_lock: Mutex<()>,
}

/// Shared handle to the options broadcast channel
#[derive(Clone)]
pub struct OptionsBus {
    inner: Arc<BusInner>,
}

impl Default for OptionsBus {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Register a new subscriber. It sees every value published from now on.
    pub fn subscribe(&self) -> OptionsSubscription {
        let (tx, rx) = async_channel::unbounded();
        self.subscribers().push(tx);
        OptionsSubscription { rx }
    }

    /// Deliver a value to all live subscribers, pruning the ones that went away
    pub fn publish(&self, options: &Options) {
        let mut subscribers = self.subscribers();
        subscribers.retain(|tx| tx.try_send(options.clone()).is_ok());
        tracing::debug!("Broadcast options to {} subscribers", subscribers.len());
    }

    /// Number of subscribers whose receiving end is still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscribers().iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Check whether two handles refer to the same channel
    pub fn same_channel(&self, other: &OptionsBus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<Options>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One subscriber's view of the broadcast: an ordered stream of documents
pub struct OptionsSubscription {
    rx: Receiver<Options>,
}

impl OptionsSubscription {
    /// Wait for the next broadcast value. `None` once every bus handle is gone.
    pub async fn next(&self) -> Option<Options> {
        self.rx.recv().await.ok()
    }

    /// Take the next value if one is already queued
    pub fn try_next(&self) -> Option<Options> {
        match self.rx.try_recv() {
            Ok(options) => Some(options),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Drain everything queued so far
    pub fn drain(&self) -> Vec<Options> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Number of values waiting to be read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
