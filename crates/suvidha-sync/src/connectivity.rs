// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity detector.
//!
//! Holds the last reachability reported by the platform and turns each
//! offline-to-online transition into exactly one [`ReconnectEvent`]. The
//! detector never probes the network itself; a reported `Online` is advisory.
//!
//! At most one [`ReconnectSubscription`] is live per detector. Dropping it (or
//! calling [`ReconnectSubscription::unsubscribe`]) detaches it, after which a
//! new subscription may be taken.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use suvidha_core::{Reachability, SuvidhaError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Emitted once per offline-to-online transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectEvent {
    pub at: DateTime<Utc>,
}

struct Slot {
    id: u64,
    tx: mpsc::UnboundedSender<ReconnectEvent>,
}

struct Inner {
    state: watch::Sender<Reachability>,
    subscriber: Mutex<Option<Slot>>,
    next_id: Mutex<u64>,
}

impl Inner {
    fn subscriber(&self) -> MutexGuard<'_, Option<Slot>> {
        // A panic while holding the lock cannot leave the slot half-written.
        self.subscriber.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared handle to the reachability state. Clones observe the same state.
#[derive(Clone)]
pub struct ConnectivityDetector {
    inner: Arc<Inner>,
}

impl ConnectivityDetector {
    pub fn new(initial: Reachability) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                state,
                subscriber: Mutex::new(None),
                next_id: Mutex::new(0),
            }),
        }
    }

    pub fn state(&self) -> Reachability {
        *self.inner.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// A receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<Reachability> {
        self.inner.state.subscribe()
    }

    /// Record the platform's current reachability.
    ///
    /// Returns `true` if this report was an offline-to-online transition.
    pub fn report(&self, reachability: Reachability) -> bool {
        let mut previous = reachability;
        let changed = self.inner.state.send_if_modified(|current| {
            if *current == reachability {
                return false;
            }
            previous = *current;
            *current = reachability;
            true
        });
        if !changed {
            return false;
        }

        info!(from = %previous, to = %reachability, "connectivity changed");
        if reachability != Reachability::Online {
            return false;
        }

        let event = ReconnectEvent { at: Utc::now() };
        let mut slot = self.inner.subscriber();
        if let Some(active) = slot.as_ref()
            && active.tx.send(event).is_err()
        {
            // Receiver is gone without having run Drop yet.
            *slot = None;
        }
        true
    }

    /// Take the detector's single reconnect subscription.
    pub fn subscribe(&self) -> Result<ReconnectSubscription, SuvidhaError> {
        let mut slot = self.inner.subscriber();
        if slot.is_some() {
            return Err(SuvidhaError::AlreadySubscribed);
        }

        let id = {
            let mut next = self.inner.next_id.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            *next
        };
        let (tx, rx) = mpsc::unbounded_channel();
        *slot = Some(Slot { id, tx });
        debug!(subscription = id, "reconnect subscription attached");

        Ok(ReconnectSubscription {
            id,
            rx,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Whether a reconnect subscription is currently attached.
    pub fn has_subscriber(&self) -> bool {
        self.inner.subscriber().is_some()
    }
}

/// Receives [`ReconnectEvent`]s from one detector.
pub struct ReconnectSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<ReconnectEvent>,
    inner: Arc<Inner>,
}

impl ReconnectSubscription {
    /// Wait for the next reconnect.
    pub async fn recv(&mut self) -> Option<ReconnectEvent> {
        self.rx.recv().await
    }

    /// Take a reconnect that has already been emitted, without waiting.
    pub fn try_recv(&mut self) -> Option<ReconnectEvent> {
        self.rx.try_recv().ok()
    }

    /// Detach from the detector.
    pub fn unsubscribe(self) {}
}

impl Drop for ReconnectSubscription {
    fn drop(&mut self) {
        let mut slot = self.inner.subscriber();
        if slot.as_ref().is_some_and(|s| s.id == self.id) {
            *slot = None;
            debug!(subscription = self.id, "reconnect subscription detached");
        }
    }
}
