//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the procfs-backed metric sources read the real
//! `/proc` on Linux and an in-memory tree in tests.

use std::io;
use std::path::Path;

/// Abstraction for filesystem operations.
///
/// Sources are moved onto sampler threads, so implementations must be
/// `Send + Sync`.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
