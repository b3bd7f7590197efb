//! # DDB Instances
//!
//! Starts and stops DynamoDB Local emulators for integration tests.
//!
//! An [`Instances`] registry unpacks a DynamoDB Local distribution into a
//! working directory, launches `java -jar DynamoDBLocal.jar --port <N>` from
//! it, keeps draining the emulator's output, and stops it again by port.
//!
//! ```no_run
//! use ddb_instances::{Instances, InstancesConfig};
//! use std::path::Path;
//!
//! # fn main() -> ddb_instances::Result<()> {
//! let instances = Instances::new(InstancesConfig::default());
//! instances.start(
//!     Path::new("target/DynamoDBLocal.tar.gz"),
//!     Path::new("target/ddb-8000"),
//!     8000,
//! )?;
//! // ... run tests against http://localhost:8000 ...
//! instances.stop(8000)?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod registry;

// Re-export main types
pub use command::emulator_command;
pub use config::{InstanceSpec, InstancesConfig, RunnerConfig};
pub use ddb_common::{Error, Port, Result};
pub use registry::{InstanceInfo, Instances};
