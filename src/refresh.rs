//! Background synchronization scheduler
//!
//! Drives the synchronizer on a fixed wall-clock interval in the background
//! using tokio channels to report pass outcomes to the main application.
//! Overlap protection lives in the synchronizer itself; if a pass is still
//! running when the next tick fires, the new trigger comes back as
//! [`PassOutcome::Skipped`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::sync::{PassOutcome, Synchronizer};

/// Messages sent from the background scheduler to the main app
#[derive(Debug, Clone)]
pub enum SyncMessage {
    /// A synchronization pass is starting
    PassStarted,
    /// A synchronization pass finished (or was skipped)
    PassCompleted(PassOutcome),
}

/// Configuration for the synchronization interval
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between synchronization passes
    pub interval: Duration,
    /// Whether the background scheduler is enabled
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1800), // 30 minutes
            enabled: true,
        }
    }
}

/// Handle for controlling the background synchronization task
pub struct SyncHandle {
    /// Channel for receiving pass messages
    pub receiver: mpsc::Receiver<SyncMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncHandle {
    /// Spawns the background synchronization task
    ///
    /// The first tick fires one full interval after spawning; the initial
    /// seeding pass is expected to have run at bootstrap already.
    ///
    /// # Arguments
    /// * `config` - Interval configuration
    /// * `synchronizer` - The shared synchronizer to drive
    pub fn spawn(config: SyncConfig, synchronizer: Arc<Synchronizer>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.interval);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let _ = msg_tx.send(SyncMessage::PassStarted).await;
                            let outcome = synchronizer.run_sync_pass().await;
                            let _ = msg_tx.send(SyncMessage::PassCompleted(outcome)).await;
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background synchronization task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for a pending message without blocking
pub fn try_recv(handle: &mut SyncHandle) -> Option<SyncMessage> {
    handle.receiver.try_recv().ok()
}
