//! A metric source that replays a fixed script.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::collector::source::{MetricSource, Unavailable};
use crate::model::{Reading, ResourceKind};

/// Step in a [`ScriptedSource`] script.
#[derive(Debug, Clone)]
enum Step {
    Reading(Reading),
    Unavailable,
}

/// Replays scripted readings, then keeps returning the last step.
///
/// An empty script is unavailable forever. Every call is counted so tests can
/// observe how often a sampler polled.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    kind: ResourceKind,
    steps: VecDeque<Step>,
    last: Option<Step>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            steps: VecDeque::new(),
            last: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that never produces a reading.
    pub fn always_unavailable(kind: ResourceKind) -> Self {
        Self::new(kind).then_unavailable()
    }

    /// Appends a successful step.
    ///
    /// The reading must carry this source's kind.
    pub fn then(mut self, reading: Reading) -> Self {
        assert_eq!(reading.kind(), self.kind, "scripted reading kind mismatch");
        self.steps.push_back(Step::Reading(reading));
        self
    }

    /// Appends a failing step.
    pub fn then_unavailable(mut self) -> Self {
        self.steps.push_back(Step::Unavailable);
        self
    }

    /// Shared counter of `sample` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl MetricSource for ScriptedSource {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn sample(&mut self) -> Result<Reading, Unavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(step) = self.steps.pop_front() {
            self.last = Some(step);
        }

        match &self.last {
            // Restamp so repeated readings look fresh.
            Some(Step::Reading(reading)) => Ok(reading.clone().taken_at_instant(Instant::now())),
            Some(Step::Unavailable) | None => {
                Err(Unavailable::Missing("scripted source has no reading".into()))
            }
        }
    }
}
