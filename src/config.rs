//! Dashboard settings.
//!
//! The binaries map their command-line flags onto [`DashboardConfig`]; the
//! defaults live here so library users and tests get the same behaviour.

use std::path::PathBuf;
use std::time::Duration;

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default time to wait for samplers to acknowledge shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A slot is marked stale after this many intervals without a new reading,
/// unless a threshold is set explicitly.
pub const STALE_INTERVALS: u32 = 3;

/// Longest accepted sampling interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Invalid dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroInterval,
    IntervalTooLong(Duration),
    ZeroStaleAfter,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroInterval => write!(f, "sampling interval must be greater than zero"),
            ConfigError::IntervalTooLong(interval) => write!(
                f,
                "sampling interval of {}s exceeds the maximum of {}s",
                interval.as_secs(),
                MAX_INTERVAL.as_secs()
            ),
            ConfigError::ZeroStaleAfter => {
                write!(f, "staleness threshold must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Sampling period of every sampler, also the redraw cadence.
    pub interval: Duration,
    /// Age after which a displayed reading is marked stale.
    /// `None` means [`STALE_INTERVALS`] times the interval.
    pub stale_after: Option<Duration>,
    /// How long shutdown waits for samplers before abandoning them.
    pub shutdown_grace: Duration,
    /// Base path of the proc filesystem.
    pub proc_path: PathBuf,
    /// Mount point whose capacity the disk row shows.
    pub disk_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            stale_after: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            proc_path: PathBuf::from("/proc"),
            disk_path: PathBuf::from("/"),
        }
    }
}

impl DashboardConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_proc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_path = path.into();
        self
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    /// The effective staleness threshold.
    pub fn stale_threshold(&self) -> Duration {
        self.stale_after.unwrap_or_else(|| {
            self.interval
                .checked_mul(STALE_INTERVALS)
                .unwrap_or(Duration::MAX)
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.interval > MAX_INTERVAL {
            return Err(ConfigError::IntervalTooLong(self.interval));
        }
        if self.stale_after.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroStaleAfter);
        }
        Ok(())
    }
}
