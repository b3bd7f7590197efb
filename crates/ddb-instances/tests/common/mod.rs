//! Shared fixtures for the integration tests: a fake JDK whose `java` is a
//! shell script, and a distribution archive to unpack.

#![allow(dead_code)]

use ddb_instances::InstancesConfig;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Prints its arguments on stdout and a line on stderr, then idles until
/// SIGTERM.
pub const COOPERATIVE_JAVA: &str = r#"#!/bin/sh
echo "fake emulator $@"
echo "warming up" >&2
exec sleep 30
"#;

/// Ignores SIGTERM, so only a kill stops it.
pub const STUBBORN_JAVA: &str = r#"#!/bin/sh
trap '' TERM
echo "ignoring SIGTERM"
while true; do sleep 1; done
"#;

pub struct TestEnv {
    pub temp: tempfile::TempDir,
    pub archive: PathBuf,
    pub java_home: PathBuf,
}

impl TestEnv {
    pub fn new(java_script: &str) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let archive = write_distribution(temp.path());
        let java_home = write_java_home(temp.path(), java_script);
        Self {
            temp,
            archive,
            java_home,
        }
    }

    pub fn config(&self) -> InstancesConfig {
        InstancesConfig {
            java_home: Some(self.java_home.clone()),
            graceful_timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    pub fn work_dir(&self, port: u16) -> PathBuf {
        self.temp.path().join("work").join(format!("ddb-{}", port))
    }
}

/// `DynamoDBLocal.tar.gz` holding a single `dynamodb/` directory.
pub fn write_distribution(dir: &Path) -> PathBuf {
    let path = dir.join("DynamoDBLocal.tar.gz");
    let file = File::create(&path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (name, content) in [
        ("dynamodb/DynamoDBLocal.jar", "not really a jar"),
        ("dynamodb/DynamoDBLocal_lib/libsqlite4java-linux-amd64.so", "so"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
    path
}

/// A `JAVA_HOME` whose `bin/java` runs `script`.
pub fn write_java_home(dir: &Path, script: &str) -> PathBuf {
    let home = dir.join("jdk");
    let bin = home.join("bin");
    fs::create_dir_all(&bin).unwrap();

    let java = bin.join("java");
    fs::write(&java, script).unwrap();
    fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();
    home
}

pub fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    predicate()
}

/// Waits for `pid` to be gone (exited and reaped).
pub fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    wait_until(timeout, || {
        !ddb_process::process_exists(pid).unwrap_or(true)
    })
}
