//! Metric sources backed by the Linux `/proc` filesystem.

pub mod parser;
mod sources;

pub use sources::{CpuSource, MemorySource};
