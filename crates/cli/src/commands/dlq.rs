//! Dead Letter Queue management.

use clap::{Args, Subcommand};
use colored::Colorize;

use dispatchq_core::domain::JobState;
use dispatchq_core::error::{AppError, Result};
use dispatchq_core::port::{Clock, JobStore};

use crate::config::Config;

#[derive(Debug, Args)]
pub struct DlqArgs {
    #[command(subcommand)]
    pub command: DlqCommand,
}

#[derive(Debug, Subcommand)]
pub enum DlqCommand {
    /// List jobs in the Dead Letter Queue
    List,
    /// Move a DLQ job back to pending with a clean slate
    Retry {
        /// Job ID
        job_id: String,
    },
    /// Permanently delete a job from the DLQ
    Delete {
        /// Job ID
        job_id: String,
    },
    /// Delete all jobs from the DLQ
    Clear {
        /// Confirm deletion of all DLQ jobs
        #[arg(long, short)]
        force: bool,
    },
}

pub async fn execute(cfg: &Config, args: &DlqArgs) -> Result<()> {
    let (store, clock) = super::open_store(cfg).await?;

    match &args.command {
        DlqCommand::List => {
            let jobs = store.dlq().await?;
            if jobs.is_empty() {
                println!("{}", "✓ Dead Letter Queue is empty".green());
                return Ok(());
            }

            println!("=== Dead Letter Queue ({} jobs) ===", jobs.len());
            println!();
            for (i, job) in jobs.iter().enumerate() {
                if i > 0 {
                    println!("{}", "-".repeat(60));
                }
                println!("Job ID: {}", job.id);
                println!("Command: {}", job.command);
                println!("Attempts: {}/{}", job.attempts, job.max_retries);
                println!("Created: {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
                println!("Failed: {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));
                if let Some(error) = &job.error {
                    println!("Error: {}", truncate(error, 300));
                }
                println!();
            }
        }

        DlqCommand::Retry { job_id } => {
            let mut job = store
                .get(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

            if job.state != JobState::Dead {
                return Err(AppError::InvalidState(format!(
                    "job {job_id} is not in the Dead Letter Queue (current state: {})",
                    job.state
                )));
            }

            job.reset_for_retry(clock.now())?;
            store.save(&job).await?;

            println!(
                "{}",
                format!("✓ Job {job_id} moved from DLQ to pending queue").green()
            );
            println!("  The job will be picked up by the next available worker");
        }

        DlqCommand::Delete { job_id } => {
            let job = store
                .get(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

            if job.state != JobState::Dead {
                return Err(AppError::InvalidState(format!(
                    "job {job_id} is not in the Dead Letter Queue (current state: {})",
                    job.state
                )));
            }

            store.delete(job_id).await?;
            println!(
                "{}",
                format!("✓ Job {job_id} permanently deleted from DLQ").green()
            );
        }

        DlqCommand::Clear { force } => {
            if !force {
                return Err(AppError::Validation(
                    "this action requires --force to confirm".to_string(),
                ));
            }

            let jobs = store.dlq().await?;
            if jobs.is_empty() {
                println!("{}", "✓ Dead Letter Queue is already empty".green());
                return Ok(());
            }

            let mut deleted = 0;
            for job in &jobs {
                match store.delete(&job.id).await {
                    Ok(()) => deleted += 1,
                    Err(e) => eprintln!("Warning: failed to delete job {}: {e}", job.id),
                }
            }
            println!(
                "{}",
                format!("✓ Cleared {deleted} job(s) from Dead Letter Queue").green()
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    }
}
