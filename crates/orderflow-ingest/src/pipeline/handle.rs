use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{PipelineSnapshot, PipelineStats};
use crate::error::IngestError;

/// Handle for controlling a running ingestion pipeline.
///
/// Dropping the handle stops the pipeline without waiting for it.
#[derive(Debug)]
pub struct PipelineHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    stats: Arc<PipelineStats>,
}

impl PipelineHandle {
    pub(crate) fn new(
        shutdown_tx: watch::Sender<bool>,
        task: JoinHandle<()>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            shutdown_tx,
            task: Some(task),
            stats,
        }
    }

    /// Signals the pipeline to stop. Safe to call any number of times.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true once a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Returns true once the loop and all its dispatches have finished.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Returns the current counters.
    pub fn stats(&self) -> PipelineSnapshot {
        self.stats.snapshot()
    }

    /// Stops the pipeline and waits for the loop and every in-flight
    /// dispatch to finish.
    ///
    /// # Errors
    ///
    /// - `IngestError::ShutdownTimeout` if `timeout` elapses first; the loop
    ///   is aborted
    /// - `IngestError::TaskFailed` if the loop panicked
    pub async fn shutdown(mut self, timeout: Duration) -> Result<PipelineSnapshot, IngestError> {
        self.stop();

        let Some(mut task) = self.task.take() else {
            return Ok(self.stats.snapshot());
        };

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => {
                let snapshot = self.stats.snapshot();
                info!(?snapshot, "Ingestion pipeline shut down");
                Ok(snapshot)
            }
            Ok(Err(e)) => Err(IngestError::TaskFailed(e.to_string())),
            Err(_) => {
                warn!(?timeout, "Ingestion pipeline did not stop in time, aborting");
                task.abort();
                Err(IngestError::ShutdownTimeout { timeout })
            }
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
