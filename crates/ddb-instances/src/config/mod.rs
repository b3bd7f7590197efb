use anyhow::{Context, Result};
use ddb_common::Port;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validation;

/// Jar launched inside the unpacked distribution.
pub const DEFAULT_JAR_NAME: &str = "DynamoDBLocal.jar";

/// How long a stopped emulator gets to exit before it is killed.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(10);

/// Lines of output kept in memory per instance.
pub const DEFAULT_RECENT_OUTPUT_LINES: usize = 100;

/// Settings shared by every instance a registry starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancesConfig {
    /// Java installation to run the emulator with. Falls back to
    /// `JAVA_HOME`, then to `java` on the `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_home: Option<PathBuf>,

    pub jar_name: String,

    /// Extra JVM options, placed before `-jar`.
    pub jvm_args: Vec<String>,

    /// Extra emulator options, placed after `--port <N>`.
    pub emulator_args: Vec<String>,

    #[serde(with = "duration_serde")]
    pub graceful_timeout: Duration,

    /// When set, each instance's output is also appended to
    /// `<log_dir>/ddb-<port>.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    pub recent_output_lines: usize,
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            java_home: None,
            jar_name: DEFAULT_JAR_NAME.to_string(),
            jvm_args: Vec::new(),
            emulator_args: Vec::new(),
            graceful_timeout: DEFAULT_GRACEFUL_TIMEOUT,
            log_dir: None,
            recent_output_lines: DEFAULT_RECENT_OUTPUT_LINES,
        }
    }
}

impl InstancesConfig {
    /// Log file for the instance on `port`, if file logging is enabled.
    pub fn log_file(&self, port: Port) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("ddb-{}.log", port)))
    }
}

/// One instance the runner should start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub port: Port,
    pub archive: PathBuf,
    pub work_dir: PathBuf,
}

/// Top-level runner configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub settings: InstancesConfig,
    pub instances: Vec<InstanceSpec>,
}

impl RunnerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: RunnerConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

/// Durations written as `"500ms"`, `"10s"` or `"2m"`.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let invalid = || format!("Invalid duration: {}", s);

        // "ms" before "s", which it also ends with
        if let Some(num) = s.strip_suffix("ms") {
            num.parse().map(Duration::from_millis).map_err(|_| invalid())
        } else if let Some(num) = s.strip_suffix('s') {
            num.parse().map(Duration::from_secs).map_err(|_| invalid())
        } else if let Some(num) = s.strip_suffix('m') {
            let mins: u64 = num.parse().map_err(|_| invalid())?;
            mins.checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(invalid)
        } else {
            Err(format!("Duration must end with 's', 'ms', or 'm': {}", s))
        }
    }
}
