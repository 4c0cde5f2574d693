//! The capability every sampler drives: read one resource's utilization now.

use std::io;

use crate::collector::procfs::parser::ParseError;
use crate::model::{Reading, ResourceKind};

/// Why a single sampling attempt produced no reading.
///
/// Never fatal: the sampler skips the tick and the dashboard keeps the last
/// value it had.
#[derive(Debug)]
pub enum Unavailable {
    /// The underlying counters could not be read.
    Io(io::Error),
    /// The counters were read but could not be understood.
    Parse(String),
    /// The counters do not contain what we need yet (no elapsed time, no
    /// such mount point, zero-sized pool).
    Missing(String),
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::Io(e) => write!(f, "I/O error: {}", e),
            Unavailable::Parse(msg) => write!(f, "parse error: {}", msg),
            Unavailable::Missing(msg) => write!(f, "no data: {}", msg),
        }
    }
}

impl std::error::Error for Unavailable {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Unavailable::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Unavailable {
    fn from(e: io::Error) -> Self {
        Unavailable::Io(e)
    }
}

impl From<ParseError> for Unavailable {
    fn from(e: ParseError) -> Self {
        Unavailable::Parse(e.message)
    }
}

/// A point-in-time reader for one resource kind.
///
/// Implementations must return promptly and must not retry internally; the
/// sampler owns the retry cadence. `sample` takes `&mut self` so sources that
/// compute deltas can keep their previous counters.
pub trait MetricSource: Send {
    /// The kind every reading from this source is stamped with.
    fn kind(&self) -> ResourceKind;

    /// Reads the current utilization.
    fn sample(&mut self) -> Result<Reading, Unavailable>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unavailable_display() {
        let io = Unavailable::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.to_string(), "I/O error: gone");
        assert!(io.source().is_some());

        let parse = Unavailable::from(ParseError::new("bad line"));
        assert_eq!(parse.to_string(), "parse error: bad line");
        assert!(parse.source().is_none());

        let missing = Unavailable::Missing("no mount".into());
        assert_eq!(missing.to_string(), "no data: no mount");
    }
}
