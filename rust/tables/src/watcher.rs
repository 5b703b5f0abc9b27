use crate::manager::TableManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Background task that folds players whose turn clock has run out.
pub struct TimeoutWatcher;

impl TimeoutWatcher {
    /// Sweeps every open table each `poll_interval` until the returned
    /// handle is shut down or dropped. Must be called inside a tokio runtime.
    pub fn spawn(manager: Arc<TableManager>, poll_interval: Duration) -> WatcherHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(poll_ms = poll_interval.as_millis() as u64, "timeout watcher started");
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let folded = manager.sweep_timeouts();
                        if folded > 0 {
                            tracing::debug!(folded, "timeout sweep folded players");
                        }
                    }
                }
            }
            tracing::info!("timeout watcher stopped");
        });
        WatcherHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

#[derive(Debug)]
pub struct WatcherHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl WatcherHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the watcher and waits for the in-flight sweep to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "timeout watcher task failed");
            }
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
