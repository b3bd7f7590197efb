//! Core domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// TCP port an emulator instance listens on; the registry key.
///
/// # Example
/// ```
/// use ddb_common::Port;
///
/// let port = Port::from(8000);
/// assert_eq!(port.get(), 8000);
/// assert_eq!(port.to_string(), "8000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Creates a new Port.
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// Returns the raw port number.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for Port {
    fn from(port: u16) -> Self {
        Self(port)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
