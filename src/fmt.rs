//! Row text for the dashboard.
//!
//! Pure formatting, no ratatui types, so the exact strings are easy to pin
//! down in tests.

use crate::model::{Reading, ResourceKind};

/// Bytes per displayed gigabyte (decimal, as disk vendors count).
const BYTES_PER_GB: f64 = 1e9;

/// Converts a byte count to decimal gigabytes.
pub fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Row text for a slot that holds a reading.
///
/// `"CPU Usage: 42.50%"`,
/// `"Memory Usage: 60.00% (Used: 6.00 GB / Total: 10.00 GB)"`.
pub fn format_reading(reading: &Reading) -> String {
    let label = reading.kind().label();
    match reading.usage() {
        Some(usage) => format!(
            "{} Usage: {:.2}% (Used: {:.2} GB / Total: {:.2} GB)",
            label,
            reading.used_percent(),
            gigabytes(usage.used),
            gigabytes(usage.total)
        ),
        None => format!("{} Usage: {:.2}%", label, reading.used_percent()),
    }
}

/// Row text for a slot that has never received a reading.
///
/// Deliberately not `0%`, which is a real value.
pub fn format_placeholder(kind: ResourceKind) -> String {
    format!("{} Usage: waiting for data", kind.label())
}

/// Block title for a slot.
pub fn format_title(kind: ResourceKind, stale: bool) -> String {
    if stale {
        format!(" {} Usage (stale) ", kind.label())
    } else {
        format!(" {} Usage ", kind.label())
    }
}
