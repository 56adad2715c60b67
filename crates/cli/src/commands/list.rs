//! List jobs, optionally filtered by state.

use tabled::{Table, Tabled};

use dispatchq_core::domain::{Job, JobState};
use dispatchq_core::port::JobStore;
use dispatchq_core::Result;

use crate::config::Config;

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "ATTEMPTS")]
    attempts: String,
    #[tabled(rename = "COMMAND")]
    command: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "UPDATED")]
    updated: String,
}

impl JobRow {
    fn from_job(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            state: job.state.to_string(),
            attempts: format!("{}/{}", job.attempts, job.max_retries),
            command: truncate(&job.command, 40),
            created: job.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated: job.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub async fn execute(cfg: &Config, state: Option<&str>) -> Result<()> {
    let filter = state.map(|s| s.parse::<JobState>()).transpose()?;

    let (store, _clock) = super::open_store(cfg).await?;
    let jobs = store.list(filter).await?;

    if jobs.is_empty() {
        match state {
            Some(s) => println!("No jobs found with state: {s}"),
            None => println!("No jobs found"),
        }
        return Ok(());
    }

    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from_job).collect();
    println!("{}", Table::new(rows));
    println!("Total: {} job(s)", jobs.len());

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
