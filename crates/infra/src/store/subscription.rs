//! Push-model snapshot delivery.
//!
//! Every subscriber sees the full current collection on subscribe and again
//! after each successful write. There are no deltas and no backlog: a
//! subscription holds only the newest snapshot it has not read yet, so a
//! slow reader skips straight to the current state.

use std::sync::mpsc::{RecvError, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::r#trait::StoreError;

#[derive(Debug)]
struct SlotState<M> {
    latest: Option<M>,
    closed: bool,
}

/// Single-value mailbox shared by one subscription and the broadcaster.
#[derive(Debug)]
struct Slot<M> {
    state: Mutex<SlotState<M>>,
    ready: Condvar,
}

impl<M> Slot<M> {
    fn new(initial: M) -> Self {
        Self {
            state: Mutex::new(SlotState {
                latest: Some(initial),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    // Slot critical sections never panic, so a poisoned slot still holds
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, SlotState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite any unread snapshot.
    fn put(&self, snapshot: M) {
        self.lock().latest = Some(snapshot);
        self.ready.notify_one();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// A subscription to store snapshots.
///
/// Intended for single-threaded consumption. Receiving returns the newest
/// snapshot published since the last read; intermediate ones are skipped.
/// When the store is dropped the subscription disconnects once its last
/// snapshot has been read; there is no automatic reconnect.
#[derive(Debug)]
pub struct Subscription<M> {
    slot: Arc<Slot<M>>,
}

impl<M> Subscription<M> {
    /// Block until a snapshot is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        let mut state = self.slot.lock();
        loop {
            if let Some(snapshot) = state.latest.take() {
                return Ok(snapshot);
            }
            if state.closed {
                return Err(RecvError);
            }
            state = self
                .slot
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take the pending snapshot without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        let mut state = self.slot.lock();
        match state.latest.take() {
            Some(snapshot) => Ok(snapshot),
            None if state.closed => Err(TryRecvError::Disconnected),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Block for up to `timeout` waiting for a snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.recv().map_err(|_| RecvTimeoutError::Disconnected);
        };

        let mut state = self.slot.lock();
        loop {
            if let Some(snapshot) = state.latest.take() {
                return Ok(snapshot);
            }
            if state.closed {
                return Err(RecvTimeoutError::Disconnected);
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(RecvTimeoutError::Timeout);
            }
            state = self
                .slot
                .ready
                .wait_timeout(state, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Fan-out of snapshots to live subscribers.
#[derive(Debug)]
pub(crate) struct SnapshotBroadcaster<M> {
    subscribers: Mutex<Vec<Arc<Slot<M>>>>,
}

impl<M> Default for SnapshotBroadcaster<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M: Clone> SnapshotBroadcaster<M> {
    /// Register a subscriber and hand it `initial` right away.
    pub(crate) fn subscribe(&self, initial: M) -> Result<Subscription<M>, StoreError> {
        let slot = Arc::new(Slot::new(initial));
        self.subscribers
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push(Arc::clone(&slot));
        Ok(Subscription { slot })
    }

    pub(crate) fn publish(&self, snapshot: &M) -> Result<(), StoreError> {
        let mut subs = self.subscribers.lock().map_err(|_| StoreError::Poisoned)?;
        // Only the broadcaster still holds slots of dropped subscriptions.
        subs.retain(|slot| Arc::strong_count(slot) > 1);
        for slot in subs.iter() {
            slot.put(snapshot.clone());
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Poison the subscriber list by panicking while it is locked.
    #[cfg(test)]
    pub(crate) fn poison(&self)
    where
        M: Send,
    {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let held = self.subscribers.lock();
                    if held.is_ok() {
                        panic!("subscriber list poisoned on purpose");
                    }
                })
                .join();
        });
    }
}

impl<M> Drop for SnapshotBroadcaster<M> {
    fn drop(&mut self) {
        let subs = self
            .subscribers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for slot in subs.iter() {
            slot.close();
        }
    }
}
