//! Enqueue a job from a JSON payload.

use colored::Colorize;

use dispatchq_core::application::enqueue::{self, EnqueueRequest};
use dispatchq_core::port::id_provider::UuidProvider;
use dispatchq_core::Result;

use crate::config::Config;

pub async fn execute(cfg: &Config, raw: &str) -> Result<()> {
    let req = EnqueueRequest::from_json(raw)?;
    let (store, clock) = super::open_store(cfg).await?;

    let job = enqueue::execute(
        store.as_ref(),
        &UuidProvider,
        clock.as_ref(),
        req,
        cfg.max_retries,
    )
    .await?;

    println!("{}", "✓ Job enqueued successfully".green().bold());
    println!("  ID: {}", job.id);
    println!("  Command: {}", job.command);
    println!("  State: {}", job.state);
    println!("  Max Retries: {}", job.max_retries);

    Ok(())
}
