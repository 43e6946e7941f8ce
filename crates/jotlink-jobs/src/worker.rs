//! Job worker: polls the queue and dispatches to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use jotlink_core::{Job, JobRepository, JobType, Result};
use jotlink_db::Database;

use crate::handler::{JobContext, JobHandler, JobResult};
use crate::DEFAULT_POLL_INTERVAL_MS;

/// Configuration for the job worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Polling interval in milliseconds when the queue is empty.
    pub poll_interval_ms: u64,
    /// Whether to enable job processing.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            enabled: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_WORKER_ENABLED` | `true` | Enable/disable job processing |
    /// | `JOB_POLL_INTERVAL_MS` | `500` | Polling interval when queue is empty |
    pub fn from_env() -> Self {
        let enabled = std::env::var("JOB_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let poll_interval_ms = std::env::var("JOB_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        Self {
            poll_interval_ms,
            enabled,
        }
    }

    /// Create a new config with custom poll interval.
    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Enable or disable job processing.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Handle for controlling a running worker.
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl WorkerHandle {
    /// Signal the worker to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| jotlink_core::Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }
}

/// Job worker that processes jobs from the queue.
pub struct JobWorker {
    db: Arc<Database>,
    config: WorkerConfig,
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
}

impl JobWorker {
    /// Create a new job worker.
    pub fn new(db: Arc<Database>, config: WorkerConfig) -> Self {
        Self {
            db,
            config,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its job type.
    pub fn register_handler<H: JobHandler + 'static>(&mut self, handler: H) {
        let job_type = handler.job_type();
        self.handlers.insert(job_type, Arc::new(handler));
        debug!(?job_type, "Registered job handler");
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        WorkerHandle { shutdown_tx }
    }

    /// Run the worker loop. Sleeps only when the queue is empty.
    pub async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Job worker is disabled, not starting");
            return;
        }

        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            "Job worker started"
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!("Job worker received shutdown signal");
                break;
            }

            match self.db.jobs.claim_next().await {
                Ok(Some(job)) => {
                    self.execute_job(job).await;
                }
                Ok(None) => {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            info!("Job worker received shutdown signal");
                            break;
                        }
                        _ = sleep(poll_interval) => {}
                    }
                }
                Err(e) => {
                    error!(
                        subsystem = "jobs",
                        component = "worker",
                        error = %e,
                        "Failed to claim job"
                    );
                    sleep(poll_interval).await;
                }
            }
        }

        info!("Job worker stopped");
    }

    /// Execute a single claimed job and record its outcome.
    async fn execute_job(&self, job: Job) {
        let job_id = job.id;
        let job_type = job.job_type;
        let start = Instant::now();

        debug!(
            subsystem = "jobs",
            component = "worker",
            job_id = %job_id,
            job_type = ?job_type,
            "Executing job"
        );

        let Some(handler) = self.handlers.get(&job_type) else {
            warn!(
                subsystem = "jobs",
                component = "worker",
                job_id = %job_id,
                job_type = ?job_type,
                "No handler registered for job type"
            );
            let _ = self
                .db
                .jobs
                .fail(job_id, &format!("no handler for {:?}", job_type))
                .await;
            return;
        };

        let result = handler.execute(JobContext::new(job)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            JobResult::Success => self.db.jobs.complete(job_id).await,
            JobResult::Failed(message) => {
                warn!(
                    subsystem = "jobs",
                    component = "worker",
                    job_id = %job_id,
                    job_type = ?job_type,
                    error = %message,
                    "Job failed"
                );
                self.db.jobs.fail(job_id, &message).await
            }
        };

        if let Err(e) = outcome {
            error!(
                subsystem = "jobs",
                component = "worker",
                job_id = %job_id,
                error = %e,
                "Failed to record job outcome"
            );
        } else {
            debug!(
                subsystem = "jobs",
                component = "worker",
                job_id = %job_id,
                duration_ms,
                "Job finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_builder() {
        let config = WorkerConfig::default()
            .with_poll_interval(1000)
            .with_enabled(false);
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(!config.enabled);
    }
}
