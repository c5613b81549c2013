//! skysnap - rolling sensor snapshots from astronomical imaging session logs
//!
//! This library parses the line-oriented session logs written during an
//! imaging run (capture quality, mount position, guiding error, temperature,
//! humidity), resolves every reading to wall-clock time and keeps a bounded
//! per-category snapshot of the most recent values for upload or query.

pub mod cli;
pub mod clock;
pub mod config;
pub mod csv_output;
pub mod discovery;
pub mod error;
pub mod json_output;
pub mod parser;
pub mod record;
pub mod ring_buffer;
pub mod sink;
pub mod snapshot;
pub mod summary;
pub mod watch;
