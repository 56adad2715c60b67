//! Worker management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use tracing::warn;

use dispatchq_core::application::WorkerPool;
use dispatchq_core::error::{AppError, Result};
use dispatchq_core::port::CommandRunner;
use dispatchq_infra_system::ShellCommandRunner;

use crate::config::Config;
use crate::pid;

#[derive(Debug, Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Start worker processes in the foreground
    Start {
        /// Number of workers (defaults to the configured worker_count)
        #[arg(short, long)]
        count: Option<usize>,
    },
    /// How to stop running workers
    Stop,
}

pub async fn execute(cfg: &Config, args: &WorkerArgs) -> Result<()> {
    match &args.command {
        WorkerCommand::Start { count } => {
            let count = count.unwrap_or(cfg.worker_count);
            if count < 1 {
                return Err(AppError::Validation(
                    "worker count must be at least 1".to_string(),
                ));
            }

            // Drop PID files left behind by dead worker processes
            pid::cleanup_orphaned_pids();

            let (store, clock) = super::open_store(cfg).await?;
            let runner: Arc<dyn CommandRunner> = Arc::new(ShellCommandRunner::new());
            let pool = WorkerPool::new(store, runner, clock, cfg.backoff_base, count);

            let worker_ids = pool.start();
            for id in &worker_ids {
                if let Err(e) = pid::save_worker_pid(id) {
                    warn!(worker_id = %id, error = %e, "failed to save worker PID file");
                }
            }

            println!("Started {count} worker(s)");
            println!("Press Ctrl+C to stop workers gracefully");

            let result = pool.run_until_signal().await;

            for id in &worker_ids {
                pid::remove_worker_pid(id);
            }
            result
        }

        WorkerCommand::Stop => {
            println!("To stop workers, press Ctrl+C in the terminal where they are running.");
            println!("Workers will gracefully finish their current jobs before stopping.");
            Ok(())
        }
    }
}
