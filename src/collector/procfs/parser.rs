//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of `/proc` files into
//! structured data, so they are testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parsed data from `/proc/meminfo`, in KiB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    /// `None` on kernels older than 3.14, which lack the field.
    pub mem_available: Option<u64>,
    pub buffers: u64,
    pub cached: u64,
}

impl MemInfo {
    /// Memory in use, in KiB.
    ///
    /// Uses `MemAvailable` when present, otherwise estimates reclaimable
    /// memory as free + buffers + page cache. `None` if that estimate
    /// overflows.
    pub fn used_kb(&self) -> Option<u64> {
        let available = match self.mem_available {
            Some(available) => available,
            None => self
                .mem_free
                .checked_add(self.buffers)?
                .checked_add(self.cached)?,
        };
        Some(self.mem_total.saturating_sub(available))
    }
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut saw_total = false;

    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = parse_kb(line);
            saw_total = true;
        } else if line.starts_with("MemFree:") {
            info.mem_free = parse_kb(line);
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = Some(parse_kb(line));
        } else if line.starts_with("Buffers:") {
            info.buffers = parse_kb(line);
        } else if line.starts_with("Cached:") {
            info.cached = parse_kb(line);
        }
    }

    if !saw_total {
        return Err(ParseError::new("MemTotal not found in meminfo"));
    }

    Ok(info)
}

/// Aggregate CPU times from the `cpu` line of `/proc/stat`, in USER_HZ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Total accounted time, `None` on overflow. Guest time is already
    /// folded into `user` and `nice` by the kernel, so it is not added again.
    pub fn total(&self) -> Option<u64> {
        [
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .into_iter()
        .try_fold(self.user, u64::checked_add)
    }

    /// Time the CPUs were not doing work, `None` on overflow.
    pub fn idle_all(&self) -> Option<u64> {
        self.idle.checked_add(self.iowait)
    }

    /// Busy percentage over the interval from `prev` to `self`.
    ///
    /// Returns `None` if no time elapsed, the counters went backwards, or
    /// either side overflows.
    pub fn busy_percent_since(&self, prev: &CpuTimes) -> Option<f64> {
        let total = self.total()?.checked_sub(prev.total()?)?;
        let idle = self.idle_all()?.saturating_sub(prev.idle_all()?);
        if total == 0 {
            return None;
        }
        let busy = total.saturating_sub(idle);
        Some((busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
    }
}

/// Parses the aggregate `cpu` line out of `/proc/stat` content.
pub fn parse_cpu_times(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("aggregate cpu line not found in stat"))?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(ParseError::new(format!(
            "cpu line has {} fields, expected at least 4 counters",
            parts.len().saturating_sub(1)
        )));
    }

    let get_val = |idx: usize| -> Result<u64, ParseError> {
        match parts.get(idx) {
            None => Ok(0),
            Some(s) => s
                .parse()
                .map_err(|_| ParseError::new(format!("invalid cpu counter '{}'", s))),
        }
    };

    let times = CpuTimes {
        user: get_val(1)?,
        nice: get_val(2)?,
        system: get_val(3)?,
        idle: get_val(4)?,
        iowait: get_val(5)?,
        irq: get_val(6)?,
        softirq: get_val(7)?,
        steal: get_val(8)?,
    };

    if times.total().is_none() {
        return Err(ParseError::new("cpu counters overflow when summed"));
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16000000 kB
MemFree:         4000000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.mem_total, 16_000_000);
        assert_eq!(info.mem_available, Some(12_000_000));
        assert_eq!(info.cached, 2_048_000);
        assert_eq!(info.used_kb(), Some(4_000_000));
    }

    #[test]
    fn test_meminfo_without_available_estimates_reclaimable() {
        let content = "\
MemTotal:       1000 kB
MemFree:         100 kB
Buffers:          50 kB
Cached:          250 kB
";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.mem_available, None);
        assert_eq!(info.used_kb(), Some(600));
    }

    #[test]
    fn test_parse_meminfo_requires_total() {
        let err = parse_meminfo("MemFree: 100 kB\n").unwrap_err();
        assert!(err.message.contains("MemTotal"));
    }

    #[test]
    fn test_parse_cpu_times_uses_aggregate_line() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
";
        let times = parse_cpu_times(content).unwrap();
        assert_eq!(times.user, 10000);
        assert_eq!(times.idle, 80000);
        assert_eq!(times.total(), Some(94800));
        assert_eq!(times.idle_all(), Some(81000));
    }

    #[test]
    fn test_parse_cpu_times_short_line_defaults_missing_counters() {
        let times = parse_cpu_times("cpu 1 2 3 4\n").unwrap();
        assert_eq!(times.iowait, 0);
        assert_eq!(times.total(), Some(10));
    }

    #[test]
    fn test_parse_cpu_times_errors() {
        assert!(parse_cpu_times("cpu0 1 2 3 4\n").is_err());
        assert!(parse_cpu_times("cpu 1 2\n").is_err());
        assert!(parse_cpu_times("cpu 1 x 3 4\n").is_err());
    }

    #[test]
    fn test_counters_that_overflow_are_rejected() {
        let max = u64::MAX;
        let err = parse_cpu_times(&format!("cpu {} 1 0 0\n", max)).unwrap_err();
        assert!(err.message.contains("overflow"));

        let content = format!("MemTotal: 1000 kB\nMemFree: {} kB\nCached: 1 kB\n", max);
        assert_eq!(parse_meminfo(&content).unwrap().used_kb(), None);
    }

    #[test]
    fn test_busy_percent_since() {
        let prev = CpuTimes {
            user: 100,
            idle: 100,
            ..Default::default()
        };
        let next = CpuTimes {
            user: 130,
            idle: 170,
            ..Default::default()
        };
        assert_eq!(next.busy_percent_since(&prev), Some(30.0));
        assert_eq!(next.busy_percent_since(&next), None);
        assert_eq!(prev.busy_percent_since(&next), None);
    }
}
