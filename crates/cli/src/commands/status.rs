//! Summary of job states, active workers and configuration.

use colored::Colorize;

use dispatchq_core::domain::JobState;
use dispatchq_core::port::JobStore;
use dispatchq_core::Result;

use crate::config::Config;
use crate::pid;

pub async fn execute(cfg: &Config) -> Result<()> {
    let (store, _clock) = super::open_store(cfg).await?;
    let stats = store.stats().await?;
    let total: i64 = stats.values().sum();

    println!("{}", "=== Job Queue Status ===".bold());
    println!();
    println!("Total Jobs: {total}");
    println!();

    println!("Job States:");
    for state in JobState::all() {
        let count = stats.get(&state).copied().unwrap_or(0);
        println!("  {} : {}", colored_state(state), count);
    }

    println!();
    println!("Active Workers:");
    let workers = pid::active_workers();
    if workers.is_empty() {
        println!("  No active workers");
    } else {
        for w in workers {
            println!("  • Worker {} (PID: {})", w.id, w.pid);
        }
    }

    println!();
    println!("Configuration:");
    println!("  Max Retries: {}", cfg.max_retries);
    println!("  Backoff Base: {:.1}", cfg.backoff_base);
    println!("  Workers: {}", cfg.worker_count);
    println!("  Database: {}", cfg.db_path);

    Ok(())
}

fn colored_state(state: JobState) -> String {
    let padded = format!("{:<12}", state.as_str());
    match state {
        JobState::Pending => padded.yellow().to_string(),
        JobState::Processing => padded.cyan().to_string(),
        JobState::Completed => padded.green().to_string(),
        JobState::Failed => padded.red().to_string(),
        JobState::Dead => padded.red().bold().to_string(),
    }
}
