//! # DDB Log Collection
//!
//! Draining of emulator output.
//!
//! A child whose stdout pipe is never read blocks as soon as the pipe
//! buffer fills. This crate provides:
//! - [`spawn_drain`]: a detached thread that reads the merged output line
//!   by line until the child closes it
//! - Output targets for the drained lines ([`FileOutputWriter`],
//!   [`RecentOutputWriter`])

pub mod drain;
pub mod output;
pub mod types;

// Re-export main types
pub use drain::{DrainConfig, DrainHandle, DrainSummary, spawn_drain};
pub use output::{FileOutputWriter, OutputWriter, RecentOutput, RecentOutputWriter};
pub use types::LogEntry;
