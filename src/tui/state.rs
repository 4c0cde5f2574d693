//! Display slots owned by the dashboard.
//!
//! Only the render loop holds a `&mut DashboardState`, so the slots need no
//! locking: samplers reach them exclusively through the update queue.

use std::time::{Duration, Instant};

use crate::fmt::{format_placeholder, format_reading};
use crate::model::{Reading, ResourceKind};

/// The last reading applied for one resource kind.
#[derive(Debug, Clone)]
pub struct DisplaySlot {
    kind: ResourceKind,
    reading: Option<Reading>,
}

impl DisplaySlot {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            reading: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// `None` until the first reading arrives.
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// True when the slot holds a reading older than `threshold`.
    ///
    /// An empty slot is never stale; it renders its own placeholder.
    pub fn is_stale(&self, now: Instant, threshold: Duration) -> bool {
        self.reading
            .as_ref()
            .is_some_and(|r| now.saturating_duration_since(r.taken_at()) > threshold)
    }

    /// The row text shown inside the slot's block.
    pub fn text(&self) -> String {
        match &self.reading {
            Some(reading) => format_reading(reading),
            None => format_placeholder(self.kind),
        }
    }
}

/// Everything the dashboard draws.
#[derive(Debug, Clone)]
pub struct DashboardState {
    slots: [DisplaySlot; 3],
    stale_after: Duration,
    /// Readings applied since startup.
    applied: u64,
}

impl DashboardState {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            slots: ResourceKind::ALL.map(DisplaySlot::new),
            stale_after,
            applied: 0,
        }
    }

    /// Stores `reading` in its kind's slot, replacing the previous one.
    pub fn apply(&mut self, reading: Reading) {
        let index = reading.kind().index();
        self.slots[index].reading = Some(reading);
        self.applied += 1;
    }

    pub fn slot(&self, kind: ResourceKind) -> &DisplaySlot {
        &self.slots[kind.index()]
    }

    /// Slots in display order.
    pub fn slots(&self) -> impl Iterator<Item = &DisplaySlot> {
        self.slots.iter()
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_empty_slots() {
        let state = DashboardState::new(Duration::from_secs(3));
        for slot in state.slots() {
            assert!(slot.reading().is_none());
            assert!(slot.text().ends_with("waiting for data"));
        }
        assert_eq!(state.applied(), 0);
    }

    #[test]
    fn test_apply_only_touches_own_slot() {
        let mut state = DashboardState::new(Duration::from_secs(3));
        state.apply(Reading::cpu(10.0));
        state.apply(Reading::cpu(20.0));

        assert_eq!(
            state.slot(ResourceKind::Cpu).reading().unwrap().used_percent(),
            20.0
        );
        assert!(state.slot(ResourceKind::Memory).reading().is_none());
        assert!(state.slot(ResourceKind::Disk).reading().is_none());
        assert_eq!(state.applied(), 2);
    }

    #[test]
    fn test_staleness() {
        let mut state = DashboardState::new(Duration::from_secs(3));
        let taken = Instant::now();
        state.apply(Reading::cpu(10.0).taken_at_instant(taken));

        let slot = state.slot(ResourceKind::Cpu);
        assert!(!slot.is_stale(taken + Duration::from_secs(3), state.stale_after()));
        assert!(slot.is_stale(taken + Duration::from_secs(4), state.stale_after()));
        // Stale readings keep their text.
        assert_eq!(slot.text(), "CPU Usage: 10.00%");

        let empty = state.slot(ResourceKind::Disk);
        assert!(!empty.is_stale(taken + Duration::from_secs(60), state.stale_after()));
    }
}
