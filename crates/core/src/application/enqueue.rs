// Enqueue Use Case

use serde::{Deserialize, Serialize};

use crate::domain::Job;
use crate::error::{AppError, Result};
use crate::port::{Clock, IdProvider, JobStore};

/// Client-supplied enqueue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    /// Shell command line to execute
    pub command: String,

    /// Custom job id; generated when absent
    #[serde(default)]
    pub id: Option<String>,

    /// Tolerated failures before the DLQ; absent or zero takes the
    /// configured default
    #[serde(default)]
    pub max_retries: Option<i32>,
}

impl EnqueueRequest {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::Validation(format!("invalid job JSON: {e}")))
    }
}

/// Validate a request and materialize the pending job
pub fn build_job(
    req: EnqueueRequest,
    default_max_retries: i32,
    id_provider: &dyn IdProvider,
    clock: &dyn Clock,
) -> Result<Job> {
    validate(&req)?;

    let max_retries = match req.max_retries {
        Some(n) if n > 0 => n,
        _ => default_max_retries,
    };
    let id = req
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| id_provider.generate_id());

    Ok(Job::new(id, req.command, max_retries, clock.now()))
}

/// Execute the enqueue use case: validate, build, persist
pub async fn execute(
    store: &dyn JobStore,
    id_provider: &dyn IdProvider,
    clock: &dyn Clock,
    req: EnqueueRequest,
    default_max_retries: i32,
) -> Result<Job> {
    let job = build_job(req, default_max_retries, id_provider, clock)?;
    store.save(&job).await?;
    Ok(job)
}

fn validate(req: &EnqueueRequest) -> Result<()> {
    if req.command.is_empty() {
        return Err(AppError::Validation("command cannot be empty".to_string()));
    }
    if req.max_retries.is_some_and(|n| n < 0) {
        return Err(AppError::Validation(
            "max_retries cannot be negative".to_string(),
        ));
    }
    Ok(())
}
