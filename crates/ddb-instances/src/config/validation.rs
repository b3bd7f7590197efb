use super::*;
use anyhow::{Result, anyhow};
use std::collections::HashSet;

/// Validate the complete configuration
pub fn validate_config(config: &RunnerConfig) -> Result<()> {
    validate_settings(&config.settings)?;
    validate_instances(&config.instances)
}

fn validate_settings(settings: &InstancesConfig) -> Result<()> {
    if settings.jar_name.trim().is_empty() {
        return Err(anyhow!("Jar name cannot be empty"));
    }

    if settings.graceful_timeout.is_zero() {
        return Err(anyhow!("Graceful timeout must be greater than 0"));
    }

    Ok(())
}

/// Ports and working directories must be unique: two instances wiping the
/// same directory would corrupt each other.
fn validate_instances(instances: &[InstanceSpec]) -> Result<()> {
    if instances.is_empty() {
        return Err(anyhow!("At least one instance must be configured"));
    }

    let mut ports = HashSet::new();
    let mut work_dirs = HashSet::new();
    for instance in instances {
        if instance.port.get() == 0 {
            return Err(anyhow!("Port must be between 1 and 65535, got: 0"));
        }

        if !ports.insert(instance.port) {
            return Err(anyhow!("Duplicate port: {}", instance.port));
        }

        if instance.work_dir.as_os_str().is_empty() {
            return Err(anyhow!("Work directory for port {} cannot be empty", instance.port));
        }

        if !work_dirs.insert(&instance.work_dir) {
            return Err(anyhow!(
                "Work directory {} is used by more than one instance",
                instance.work_dir.display()
            ));
        }
    }

    Ok(())
}
