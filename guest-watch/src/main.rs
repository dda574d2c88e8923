//! Guest Watch - Proxmox guest resource watcher
//!
//! Meant to be run periodically (cron or a systemd timer). Each run:
//! - Loads the previous per-guest state
//! - Reads `pvesh get /cluster/resources`
//! - Notifies when a guest's CPU/RAM/disk usage escalates to WARNING or CRITICAL
//! - Writes the new state back for the next run
//!
//! # Environment variables
//!
//! | Variable             | Default      | Description                 |
//! |----------------------|--------------|-----------------------------|
//! | `GUEST_WATCH_CONFIG` | `config.yml` | Path to the YAML config     |
//! | `RUST_LOG`           | `guest_watch=info` | Log filter            |

use anyhow::{Context, Result};
use guest_watch::config::WatchConfig;
use guest_watch::monitor::run_once;
use guest_watch::notify::HttpNotifier;
use guest_watch::source::CommandSource;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("guest_watch=info")),
        )
        .init();

    let config = match WatchConfig::load().await {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Guest Watch starting (warning: {}%, critical: {}%, state: {})",
        config.threshold.warning,
        config.threshold.critical,
        config.state_file.display()
    );

    let (program, args) = config
        .command
        .split_first()
        .context("Table command is empty")?;
    let source = CommandSource::new(program.clone(), args.to_vec(), config.command_timeout());

    let notifier = HttpNotifier::new(
        config.notification_url.clone(),
        config.notification_timeout(),
        config.accept_invalid_certs,
    )
    .context("Failed to build notification client")?;

    run_once(&config, &source, notifier).await?;
    Ok(())
}
