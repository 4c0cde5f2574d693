//! Values that flow from the samplers to the dashboard.

use std::fmt;
use std::time::Instant;

/// The resource a reading describes. Also selects the display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Cpu,
    Memory,
    Disk,
}

impl ResourceKind {
    /// Every kind, in display order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Cpu,
        ResourceKind::Memory,
        ResourceKind::Disk,
    ];

    /// Position of this kind's slot in fixed-size per-kind arrays.
    pub const fn index(self) -> usize {
        match self {
            ResourceKind::Cpu => 0,
            ResourceKind::Memory => 1,
            ResourceKind::Disk => 2,
        }
    }

    /// Human label used in titles and rows.
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Cpu => "CPU",
            ResourceKind::Memory => "Memory",
            ResourceKind::Disk => "Disk",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Absolute byte usage of a memory pool or filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteUsage {
    pub used: u64,
    pub total: u64,
}

/// A point-in-time utilization reading.
///
/// Readings are immutable once built; they are moved from the sampler into
/// the update queue and from there into a display slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    kind: ResourceKind,
    used_percent: f64,
    usage: Option<ByteUsage>,
    taken_at: Instant,
}

impl Reading {
    /// A CPU reading, stamped now.
    pub fn cpu(used_percent: f64) -> Self {
        Self::new(ResourceKind::Cpu, used_percent, None, Instant::now())
    }

    /// A memory reading, stamped now.
    pub fn memory(used_percent: f64, used: u64, total: u64) -> Self {
        Self::new(
            ResourceKind::Memory,
            used_percent,
            Some(ByteUsage { used, total }),
            Instant::now(),
        )
    }

    /// A disk reading, stamped now.
    pub fn disk(used_percent: f64, used: u64, total: u64) -> Self {
        Self::new(
            ResourceKind::Disk,
            used_percent,
            Some(ByteUsage { used, total }),
            Instant::now(),
        )
    }

    pub fn new(
        kind: ResourceKind,
        used_percent: f64,
        usage: Option<ByteUsage>,
        taken_at: Instant,
    ) -> Self {
        Self {
            kind,
            used_percent,
            usage,
            taken_at,
        }
    }

    /// Returns a copy of this reading stamped with a different time.
    pub fn taken_at_instant(self, taken_at: Instant) -> Self {
        Self { taken_at, ..self }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn used_percent(&self) -> f64 {
        self.used_percent
    }

    pub fn usage(&self) -> Option<ByteUsage> {
        self.usage
    }

    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }
}

/// Computes `part / whole` as a percentage, clamped to `0..=100`.
///
/// Returns `None` when `whole` is zero.
pub fn percent_of(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some((part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0))
}
