//! Emulator command line.

use crate::config::InstancesConfig;
use ddb_process::CommandSpec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const JAVA_EXECUTABLE: &str = "java.exe";
#[cfg(not(windows))]
const JAVA_EXECUTABLE: &str = "java";

/// Java installation to use: the configured one, else `JAVA_HOME`.
pub fn resolve_java_home(config: &InstancesConfig) -> Option<PathBuf> {
    config.java_home.clone().or_else(|| {
        std::env::var_os("JAVA_HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    })
}

/// `<java_home>/bin/java`, or plain `java` for a `PATH` lookup.
pub fn java_binary(java_home: Option<&Path>) -> PathBuf {
    match java_home {
        Some(home) => home.join("bin").join(JAVA_EXECUTABLE),
        None => PathBuf::from(JAVA_EXECUTABLE),
    }
}

/// Builds the command that runs the emulator unpacked in `dir` on `port`:
///
/// ```text
/// java -Djava.library.path=<dir> [jvm_args] -jar DynamoDBLocal.jar --port <port> [emulator_args]
/// ```
pub fn emulator_command(config: &InstancesConfig, dir: &Path, port: u16) -> CommandSpec {
    let java = java_binary(resolve_java_home(config).as_deref());
    let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());

    let mut library_path = OsString::from("-Djava.library.path=");
    library_path.push(dir.as_os_str());

    CommandSpec::new(java, &dir)
        .arg(library_path)
        .args(&config.jvm_args)
        .arg("-jar")
        .arg(&config.jar_name)
        .arg("--port")
        .arg(port.to_string())
        .args(&config.emulator_args)
}
