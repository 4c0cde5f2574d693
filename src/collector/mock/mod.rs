//! Test doubles for the metric sources.
//!
//! `MockFs` stands in for `/proc` so the procfs-backed sources can be driven
//! from fixed content; `ScriptedSource` replays a canned sequence of results
//! for sampler and lifecycle tests.

mod filesystem;
mod scenarios;
mod scripted;

pub use filesystem::MockFs;
pub use scripted::ScriptedSource;
