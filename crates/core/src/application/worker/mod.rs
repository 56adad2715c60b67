// Worker - claim/execute/settle loop

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::application::backoff::next_retry_at;
use crate::domain::Job;
use crate::error::Result;
use crate::port::{Clock, CommandOutcome, CommandRunner, JobStore};
use constants::TICK_INTERVAL;

/// Worker drains runnable jobs from the shared store.
///
/// One worker is one logical thread of control: it shares nothing with its
/// siblings except the store, which serializes all claims.
pub struct Worker {
    id: String,
    store: Arc<dyn JobStore>,
    runner: Arc<dyn CommandRunner>,
    clock: Arc<dyn Clock>,
    backoff_base: f64,
}

impl Worker {
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<dyn CommandRunner>,
        clock: Arc<dyn Clock>,
        backoff_base: f64,
    ) -> Self {
        // Short id for logs and claim stamps
        let id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        Self {
            id,
            store,
            runner,
            clock,
            backoff_base,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run the poll loop until shutdown is signalled.
    ///
    /// Cancellation is observed between ticks, never mid-execution: an
    /// in-flight command runs to completion (or its timeout) first.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker_id = %self.id, "worker started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            tokio::select! {
                _ = sleep(TICK_INTERVAL) => {}
                _ = shutdown.wait() => break,
            }
            match self.process_next().await {
                Ok(_) => {}
                Err(e) => {
                    // Store hiccup: log and retry on the next tick
                    error!(worker_id = %self.id, error = %e, "worker tick failed");
                }
            }
        }
        info!(worker_id = %self.id, "worker stopped");
        Ok(())
    }

    /// Claim and execute one job (returns true if a job was processed)
    pub async fn process_next(&self) -> Result<bool> {
        let Some(job) = self.store.claim_next(&self.id).await? else {
            return Ok(false);
        };

        info!(
            worker_id = %self.id,
            job_id = %job.id,
            command = %job.command,
            attempt = job.attempts,
            "processing job"
        );

        let outcome = self.runner.run(&job.command).await;
        self.settle(job, outcome).await?;
        Ok(true)
    }

    /// Persist the execution outcome: completed, failed + retry, or dead
    async fn settle(&self, mut job: Job, outcome: CommandOutcome) -> Result<()> {
        let now = self.clock.now();

        if outcome.success {
            job.mark_completed(outcome.output, now)?;
            info!(worker_id = %self.id, job_id = %job.id, "job completed");
        } else {
            let message = failure_message(&outcome);
            if job.can_retry() {
                // Delay derives from the pre-increment attempt count
                let next = next_retry_at(now, job.attempts, self.backoff_base);
                job.mark_failed(message, next, now)?;
                info!(
                    worker_id = %self.id,
                    job_id = %job.id,
                    attempt = job.attempts,
                    max_retries = job.max_retries,
                    next_retry_at = %next,
                    "job failed, retry scheduled"
                );
            } else {
                job.mark_dead(message, now)?;
                warn!(
                    worker_id = %self.id,
                    job_id = %job.id,
                    attempts = job.attempts,
                    "job moved to dead letter queue"
                );
            }
        }

        self.store.save(&job).await
    }
}

fn failure_message(outcome: &CommandOutcome) -> String {
    let detail = outcome.error.as_deref().unwrap_or("command failed");
    if outcome.output.is_empty() {
        detail.to_string()
    } else {
        format!("{detail}\nOutput: {}", outcome.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_appends_captured_output() {
        let bare = CommandOutcome::failure("", "command exited with non-zero status: 1");
        assert_eq!(failure_message(&bare), "command exited with non-zero status: 1");

        let with_output = CommandOutcome::failure("oops\n", "command exited with non-zero status: 1");
        assert_eq!(
            failure_message(&with_output),
            "command exited with non-zero status: 1\nOutput: oops\n"
        );
    }

    #[test]
    fn failure_message_without_detail_still_says_something() {
        let outcome = CommandOutcome {
            success: false,
            output: String::new(),
            error: None,
        };
        assert_eq!(failure_message(&outcome), "command failed");
    }
}
