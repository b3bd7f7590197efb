//! Error types for ddb-local.
//!
//! # Rust Learning Note
//!
//! There are only two kinds of failure a caller needs to tell apart:
//!
//! - **I/O failures**: the archive is missing or broken, a directory could
//!   not be wiped or recreated, the emulator could not be spawned.
//! - **Invalid arguments**: asking to stop a port nothing is running on.
//!
//! Both travel as variants of one enum so callers can `?` them through and
//! still `match` on the kind when it matters:
//!
//! ```rust
//! use ddb_common::{Error, Result};
//!
//! fn stop(port: u16) -> Result<()> {
//!     Err(Error::not_running(port))
//! }
//!
//! let err = stop(8000).unwrap_err();
//! assert!(err.is_invalid_argument());
//! assert!(err.to_string().contains("8000"));
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ddb-local operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ddb-local operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No instance is registered under the port.
    #[error("No DynamoDB Local instances running on port {port}")]
    NotRunning {
        port: u16,
    },

    /// A filesystem or process operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The distribution archive does not have the expected layout.
    #[error("Invalid archive {}: {reason}", path.display())]
    InvalidArchive {
        path: PathBuf,
        reason: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a NotRunning error.
    pub fn not_running(port: u16) -> Self {
        Self::NotRunning { port }
    }

    /// Wraps an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates an InvalidArchive error.
    pub fn invalid_archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for failures caused by the caller's arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::NotRunning { .. } | Self::Config(_))
    }

    /// True for failures of the filesystem, the archive or process spawning.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::InvalidArchive { .. })
    }
}

/// Adds context to `std::io::Result` values.
pub trait IoResultExt<T> {
    /// Converts the I/O error into [`Error::Io`] with the given context.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_mentions_port() {
        let err = Error::not_running(8000);
        assert!(matches!(err, Error::NotRunning { port: 8000 }));
        assert_eq!(
            err.to_string(),
            "No DynamoDB Local instances running on port 8000"
        );
        assert!(err.is_invalid_argument());
        assert!(!err.is_io());
    }

    #[test]
    fn test_io_context() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result
            .with_context(|| "Failed to open archive /tmp/x.tar.gz")
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Failed to open archive"));
        assert!(message.contains("gone"));
        assert!(err.is_io());
    }

    #[test]
    fn test_invalid_archive_is_io() {
        let err = Error::invalid_archive("/tmp/work", "expected one top-level directory, found 2");
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/work"));
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::config("port must be non-zero");

        match err {
            Error::Config(message) => assert_eq!(message, "port must be non-zero"),
            _ => panic!("Wrong error type"),
        }
    }
}
