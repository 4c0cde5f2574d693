//! Metric sources for the dashboard.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                MetricSource (trait)                      │
//! │  ┌────────────────┐ ┌────────────────┐ ┌──────────────┐  │
//! │  │   CpuSource    │ │  MemorySource  │ │  DiskSource  │  │
//! │  │  /proc/stat    │ │ /proc/meminfo  │ │   sysinfo    │  │
//! │  └───────┬────────┘ └───────┬────────┘ └──────────────┘  │
//! │          └────────┬─────────┘                            │
//! │            ┌──────▼──────┐                               │
//! │            │  FileSystem │ (trait)                       │
//! │            └──────┬──────┘                               │
//! └───────────────────┼──────────────────────────────────────┘
//!            ┌────────┴────────┐
//!     ┌──────▼──────┐   ┌──────▼──────┐
//!     │   RealFs    │   │   MockFs    │
//!     └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use resmon::collector::{CpuSource, MetricSource, MockFs};
//!
//! let fs = MockFs::typical_system();
//! let mut cpu = CpuSource::new(fs, "/proc");
//! let reading = cpu.sample().unwrap();
//! assert!(reading.used_percent() <= 100.0);
//! ```

mod disk;
pub mod mock;
pub mod procfs;
mod source;
pub mod traits;

pub use disk::DiskSource;
pub use mock::{MockFs, ScriptedSource};
pub use procfs::{CpuSource, MemorySource};
pub use source::{MetricSource, Unavailable};
pub use traits::{FileSystem, RealFs};
