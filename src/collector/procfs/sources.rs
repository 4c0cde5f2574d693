//! CPU and memory sources reading `/proc/stat` and `/proc/meminfo`.

use std::path::PathBuf;

use tracing::trace;

use crate::collector::procfs::parser::{CpuTimes, parse_cpu_times, parse_meminfo};
use crate::collector::source::{MetricSource, Unavailable};
use crate::collector::traits::FileSystem;
use crate::model::{Reading, ResourceKind, percent_of};

/// Whole-machine CPU busy percentage from `/proc/stat`.
///
/// Each sample covers the time since the previous one. The first sample has
/// no baseline and covers the time since boot.
pub struct CpuSource<F: FileSystem> {
    fs: F,
    stat_path: PathBuf,
    last: Option<CpuTimes>,
}

impl<F: FileSystem> CpuSource<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            stat_path: proc_path.into().join("stat"),
            last: None,
        }
    }
}

impl<F: FileSystem> MetricSource for CpuSource<F> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Cpu
    }

    fn sample(&mut self) -> Result<Reading, Unavailable> {
        let content = self.fs.read_to_string(&self.stat_path)?;
        let now = parse_cpu_times(&content)?;
        let prev = self.last.replace(now).unwrap_or_default();

        trace!(total = ?now.total(), idle = ?now.idle_all(), "cpu counters");

        now.busy_percent_since(&prev)
            .map(Reading::cpu)
            .ok_or_else(|| Unavailable::Missing("no cpu time elapsed since last sample".into()))
    }
}

/// Memory utilization from `/proc/meminfo`.
pub struct MemorySource<F: FileSystem> {
    fs: F,
    meminfo_path: PathBuf,
}

impl<F: FileSystem> MemorySource<F> {
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            meminfo_path: proc_path.into().join("meminfo"),
        }
    }
}

impl<F: FileSystem> MetricSource for MemorySource<F> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Memory
    }

    fn sample(&mut self) -> Result<Reading, Unavailable> {
        let content = self.fs.read_to_string(&self.meminfo_path)?;
        let info = parse_meminfo(&content)?;

        let overflow = || Unavailable::Parse("meminfo counters overflow".into());
        let total = info.mem_total.checked_mul(1024).ok_or_else(overflow)?;
        let used = info
            .used_kb()
            .and_then(|kb| kb.checked_mul(1024))
            .ok_or_else(overflow)?;
        let percent = percent_of(used, total)
            .ok_or_else(|| Unavailable::Missing("MemTotal is zero".into()))?;

        Ok(Reading::memory(percent, used, total))
    }
}
