//! # DDB Process
//!
//! Low-level process operations for ddb-local.
//!
//! This crate provides:
//! - The narrow [`ChildProcess`] / [`ProcessLauncher`] interface the
//!   instance registry is written against
//! - A system implementation that merges stderr into stdout
//! - Graceful and forced termination
//! - Process existence checks

pub mod check;
pub mod child;
pub mod execute;
pub mod terminate;

// Re-export main types
pub use check::process_exists;
pub use child::{ChildProcess, CommandSpec, MergedOutput, ProcessLauncher};
pub use execute::{SystemChild, SystemLauncher};
pub use terminate::{force_kill, terminate_gracefully};
