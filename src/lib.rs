//! resmon - terminal dashboard for CPU, memory and disk utilization.
//!
//! Each resource is polled on its own thread by a [`sampler::Sampler`]; readings
//! flow through a coalescing [`queue::UpdateQueue`] to a single-threaded
//! [`tui::Dashboard`] that owns the terminal. [`lifecycle::Lifecycle`] wires
//! them together and handles shutdown.
//!
//! The crate also carries the small JSON-backed store used by the
//! `inventory` binary.

pub mod cancel;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod queue;
pub mod sampler;
pub mod tui;
