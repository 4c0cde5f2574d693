//! Periodic sampling of one metric source.
//!
//! A [`Sampler`] runs on its own thread and cycles
//! `Idle -> Sampling -> Publishing -> Idle` once per interval until its
//! cancellation token fires. A failed sample is logged and skipped; the
//! dashboard keeps showing the previous reading.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::cancel::CancellationToken;
use crate::collector::MetricSource;
use crate::model::ResourceKind;
use crate::queue::UpdateQueue;

/// Where a sampler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SamplerState {
    Idle,
    Sampling,
    Publishing,
}

impl SamplerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SamplerState::Sampling,
            2 => SamplerState::Publishing,
            _ => SamplerState::Idle,
        }
    }
}

/// Read-only view of a sampler's state, usable from other threads while the
/// sampler runs.
#[derive(Debug, Clone)]
pub struct StateWatch {
    state: Arc<AtomicU8>,
}

impl StateWatch {
    pub fn get(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Counters reported by a sampler when it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerStats {
    pub kind: ResourceKind,
    /// Readings handed to the update queue.
    pub published: u64,
    /// Ticks skipped because the source was unavailable.
    pub skipped: u64,
}

/// Drives one [`MetricSource`] on a fixed period.
pub struct Sampler {
    source: Box<dyn MetricSource>,
    interval: Duration,
    state: Arc<AtomicU8>,
    stats: SamplerStats,
}

impl Sampler {
    pub fn new(source: Box<dyn MetricSource>, interval: Duration) -> Self {
        let kind = source.kind();
        Self {
            source,
            interval,
            state: Arc::new(AtomicU8::new(SamplerState::Idle as u8)),
            stats: SamplerStats {
                kind,
                published: 0,
                skipped: 0,
            },
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.stats.kind
    }

    pub fn state(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// A handle that keeps reporting this sampler's state after it has been
    /// moved onto its thread.
    pub fn watch(&self) -> StateWatch {
        StateWatch {
            state: Arc::clone(&self.state),
        }
    }

    fn set_state(&self, state: SamplerState) {
        self.state.store(state as u8, Ordering::Release);
        trace!(kind = %self.kind(), ?state, "sampler state");
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    /// Performs one sampling cycle. Returns `true` if a reading was published.
    pub fn tick(&mut self, queue: &UpdateQueue) -> bool {
        self.set_state(SamplerState::Sampling);
        let result = self.source.sample();

        let published = match result {
            Ok(reading) => {
                self.set_state(SamplerState::Publishing);
                queue.submit(reading);
                self.stats.published += 1;
                true
            }
            Err(e) => {
                debug!(kind = %self.kind(), error = %e, "sample unavailable, skipping tick");
                self.stats.skipped += 1;
                false
            }
        };

        self.set_state(SamplerState::Idle);
        published
    }

    /// Samples until `token` is cancelled, then returns the final counters.
    ///
    /// Cancellation is only observed between ticks; an in-flight sample
    /// always completes.
    pub fn run(mut self, queue: &UpdateQueue, token: &CancellationToken) -> SamplerStats {
        debug!(kind = %self.kind(), interval = ?self.interval, "sampler started");

        while !token.is_cancelled() {
            let started = Instant::now();
            self.tick(queue);

            let elapsed = started.elapsed();
            if elapsed > self.interval {
                warn!(
                    kind = %self.kind(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "sample took longer than the sampling interval"
                );
            }

            if token.wait_timeout(self.interval.saturating_sub(elapsed)) {
                break;
            }
        }

        debug!(
            kind = %self.kind(),
            published = self.stats.published,
            skipped = self.stats.skipped,
            "sampler stopped"
        );
        self.stats
    }
}
