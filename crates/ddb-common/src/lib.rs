//! # DDB Common
//!
//! Common types shared across the ddb-local crates.
//!
//! This crate provides the foundational pieces the other crates build on:
//! the error taxonomy and the port type that keys the instance registry.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Error, IoResultExt, Result};
pub use types::Port;
