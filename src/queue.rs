//! Coalescing hand-off from the samplers to the render loop.
//!
//! Samplers call [`UpdateQueue::submit`] from their own threads; the render
//! loop is the only caller of [`UpdateQueue::drain_and_apply`]. The queue
//! holds at most one pending reading per resource kind: a newer submission
//! replaces an undrained older one, so the queue never grows past three
//! entries and a drain always sees the latest value per kind.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::model::{Reading, ResourceKind};

/// Notified when the queue goes from empty to non-empty.
///
/// The render loop installs one so it can block until there is work instead
/// of polling.
pub trait Wake: Send + Sync {
    fn wake(&self);
}

#[derive(Debug, Default)]
struct Pending {
    slots: [Option<Reading>; 3],
    /// Submissions replaced before they were drained.
    coalesced: u64,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// The single serialization point between samplers and the dashboard.
#[derive(Default)]
pub struct UpdateQueue {
    pending: Mutex<Pending>,
    /// Held for the whole of a drain so applications never overlap.
    draining: Mutex<()>,
    waker: Option<Box<dyn Wake>>,
}

impl UpdateQueue {
    /// Creates a queue with no waker; the consumer has to poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue that calls `waker` whenever it stops being empty.
    pub fn with_waker(waker: impl Wake + 'static) -> Self {
        Self {
            waker: Some(Box::new(waker)),
            ..Self::default()
        }
    }

    /// Queues `reading` for its kind's slot, replacing any undrained one.
    ///
    /// Safe to call concurrently from any number of threads.
    pub fn submit(&self, reading: Reading) {
        let kind = reading.kind();
        let was_empty = {
            let mut pending = self.lock_pending();
            let was_empty = pending.is_empty();
            if pending.slots[kind.index()].replace(reading).is_some() {
                pending.coalesced += 1;
                trace!(%kind, "coalesced undrained reading");
            }
            was_empty
        };

        // Wake outside the lock; the waker may block on a channel.
        if was_empty && let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    /// Takes every pending reading and passes each to `apply`.
    ///
    /// At most one reading per kind is applied, always the most recently
    /// submitted one. Drains are serialized: a second caller blocks until
    /// the first has finished applying. Returns the number applied.
    pub fn drain_and_apply(&self, mut apply: impl FnMut(Reading)) -> usize {
        let _draining = self
            .draining
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let taken = std::mem::take(&mut self.lock_pending().slots);

        let mut applied = 0;
        for reading in taken.into_iter().flatten() {
            apply(reading);
            applied += 1;
        }
        applied
    }

    pub fn has_pending(&self) -> bool {
        !self.lock_pending().is_empty()
    }

    /// Whether a reading for `kind` is waiting to be drained.
    pub fn is_pending(&self, kind: ResourceKind) -> bool {
        self.lock_pending().slots[kind.index()].is_some()
    }

    /// Number of submissions that were superseded before being drained.
    pub fn coalesced(&self) -> u64 {
        self.lock_pending().coalesced
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
