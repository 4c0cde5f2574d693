//! Filesystem capacity of one mount point.
//!
//! `/proc` exposes disk I/O counters but not capacity, so this source asks
//! `sysinfo` for the mounted filesystems instead.
//!
//! `sysinfo` reports total and available space only, so "used" is everything
//! the calling user cannot allocate: blocks reserved for root count as used.
//! On filesystems with a reserve (ext4 keeps 5% by default) the percentage is
//! therefore a few points above `df`'s `Use%`, which excludes the reserve.

use std::path::{Path, PathBuf};

use sysinfo::Disks;

use crate::collector::source::{MetricSource, Unavailable};
use crate::model::{Reading, ResourceKind, percent_of};

/// Used space of the filesystem mounted at a given path.
pub struct DiskSource {
    disks: Disks,
    mount_point: PathBuf,
}

impl DiskSource {
    /// Creates a source for the filesystem mounted at `mount_point`
    /// (usually "/").
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
            mount_point: mount_point.into(),
        }
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

impl MetricSource for DiskSource {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Disk
    }

    fn sample(&mut self) -> Result<Reading, Unavailable> {
        self.disks.refresh();
        if !self
            .disks
            .list()
            .iter()
            .any(|d| d.mount_point() == self.mount_point)
        {
            // The mount may have appeared after startup.
            self.disks.refresh_list();
        }

        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.mount_point)
            .ok_or_else(|| {
                Unavailable::Missing(format!(
                    "no filesystem mounted at {}",
                    self.mount_point.display()
                ))
            })?;

        let (percent, used, total) = space_usage(disk.total_space(), disk.available_space())
            .ok_or_else(|| {
                Unavailable::Missing(format!(
                    "filesystem at {} reports zero size",
                    self.mount_point.display()
                ))
            })?;

        Ok(Reading::disk(percent, used, total))
    }
}

/// `(percent, used, total)` from total and user-available bytes.
///
/// Returns `None` for a zero-sized filesystem.
fn space_usage(total: u64, available: u64) -> Option<(f64, u64, u64)> {
    let used = total.saturating_sub(available);
    let percent = percent_of(used, total)?;
    Some((percent, used, total))
}
