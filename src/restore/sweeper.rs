/// Session Sweeper
///
/// A single background task that evicts expired restore records on a fixed
/// period, independent of request traffic. Ticks are serialized by the task
/// itself, so a sweep never overlaps another sweep; against request handlers
/// it serializes through the table's lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::session_table::RestoreSessionTable;

pub struct SessionSweeper;

impl SessionSweeper {
    /// Spawn the sweeper on the current tokio runtime.
    pub fn spawn(table: Arc<RestoreSessionTable>, period: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(period_seconds = period.as_secs(), "Restore session sweeper started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        let evicted = table.sweep(Utc::now());
                        if evicted > 0 {
                            tracing::info!(evicted, remaining = table.len(), "Expired restore sessions evicted");
                        } else {
                            tracing::debug!("Restore session sweep found nothing to evict");
                        }
                    }
                }
            }

            tracing::info!("Restore session sweeper stopped");
        });

        SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Owner handle for a running sweeper.
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait until its task has exited.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!(error = %e, "Restore session sweeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
