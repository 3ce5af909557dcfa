//! horocache daemon entry point
//!
//! Seeds the cache with an initial synchronization pass, then keeps it fresh
//! on a fixed interval until interrupted.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use horocache::cache::{CacheManager, ResponseCache};
use horocache::cli::{Cli, StartupConfig};
use horocache::fetch::HttpFetcher;
use horocache::refresh::{SyncConfig, SyncHandle, SyncMessage};
use horocache::sync::Synchronizer;

/// Bounded fan-out while warming the response cache
const PRECACHE_CONCURRENCY: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let manager = match &config.data_file {
        Some(path) => CacheManager::with_path(path.clone()),
        None => CacheManager::new().ok_or("could not determine a data directory")?,
    };

    let fetcher = Arc::new(HttpFetcher::new()?.with_response_cache(ResponseCache::new()));

    if config.precache {
        info!("warming response cache");
        fetcher
            .precache(chrono::Local::now().date_naive(), PRECACHE_CONCURRENCY)
            .await;
    }

    let synchronizer = Arc::new(Synchronizer::new(fetcher, Some(manager)));

    info!("running initial synchronization pass");
    synchronizer.run_sync_pass().await;

    if config.run_once {
        return Ok(());
    }

    let handle = SyncHandle::spawn(
        SyncConfig {
            interval: config.interval,
            enabled: true,
        },
        Arc::clone(&synchronizer),
    );
    info!(interval_secs = config.interval.as_secs(), "scheduler started");

    run_until_interrupted(handle).await;
    Ok(())
}

/// Logs scheduler messages until ctrl-c arrives, then shuts down cleanly
async fn run_until_interrupted(mut handle: SyncHandle) {
    loop {
        tokio::select! {
            message = handle.receiver.recv() => {
                match message {
                    Some(SyncMessage::PassStarted) => info!("synchronization pass started"),
                    Some(SyncMessage::PassCompleted(outcome)) => {
                        info!(?outcome, "synchronization pass finished")
                    }
                    None => {
                        error!("scheduler channel closed unexpectedly");
                        return;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                handle.shutdown().await;
                return;
            }
        }
    }
}
