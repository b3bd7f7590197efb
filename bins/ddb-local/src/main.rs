use anyhow::{Context, Result};
use clap::Parser;
use ddb_instances::{Instances, RunnerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Runs the DynamoDB Local instances listed in a configuration file until
/// interrupted.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Directory for per-instance output logs (overrides config)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Run duration in seconds (for testing)
    #[arg(long)]
    run_duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug);

    info!("Starting ddb-local");
    info!("Config file: {}", args.config.display());

    let mut config = RunnerConfig::load_from_file(&args.config)?;
    if let Some(log_dir) = args.log_dir {
        config.settings.log_dir = Some(log_dir);
    }

    info!("Loaded configuration for {} instances", config.instances.len());

    let instances = Arc::new(Instances::new(config.settings.clone()));

    // Unpacking and spawning block; keep them off the runtime threads
    let starting = Arc::clone(&instances);
    let started = tokio::task::spawn_blocking(move || start_all(&starting, &config))
        .await
        .context("Start task panicked")?;

    if let Err(e) = started {
        error!("Failed to start instances: {:#}", e);
        shutdown(instances).await?;
        return Err(e);
    }

    info!("All instances started: {:?}", instances.ports());

    if let Some(duration) = args.run_duration {
        info!("Running for {} seconds (test mode)", duration);
        tokio::time::sleep(tokio::time::Duration::from_secs(duration)).await;
    } else {
        wait_for_shutdown_signal().await?;
    }

    info!("Shutting down...");
    shutdown(instances).await
}

/// Stops every instance and waits until each one has exited.
async fn shutdown(instances: Arc<Instances>) -> Result<()> {
    let stopped = instances.stop_all();
    info!("Stopped {} instances", stopped);

    // Reaping blocks for up to the grace period
    tokio::task::spawn_blocking(move || instances.wait_for_stopped())
        .await
        .context("Shutdown task panicked")?;

    info!("All instances exited");
    Ok(())
}

fn start_all(instances: &Instances, config: &RunnerConfig) -> Result<()> {
    for spec in &config.instances {
        instances
            .start(&spec.archive, &spec.work_dir, spec.port.get())
            .with_context(|| format!("Failed to start instance on port {}", spec.port))?;
    }
    Ok(())
}

fn initialize_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}

async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C signal");
    }

    Ok(())
}
