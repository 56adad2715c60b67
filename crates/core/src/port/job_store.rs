// Job Store Port (Interface)
//
// The store is the single source of truth and the only coordination point
// between workers: all claims serialize through its transactional layer.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Job, JobId, JobState};
use crate::error::Result;

/// Durable store of jobs
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Upsert a job by id, overwriting all mutable fields
    async fn save(&self, job: &Job) -> Result<()>;

    /// Point lookup by id
    async fn get(&self, id: &JobId) -> Result<Option<Job>>;

    /// Enumerate jobs, optionally filtered by state, newest first
    async fn list(&self, state: Option<JobState>) -> Result<Vec<Job>>;

    /// Job counts per state
    async fn stats(&self) -> Result<HashMap<JobState, i64>>;

    /// Remove a job row
    async fn delete(&self, id: &JobId) -> Result<()>;

    /// Atomically claim the oldest runnable job for `worker_id`.
    ///
    /// Runnable means `pending`, `failed` with an elapsed `next_retry_at`,
    /// or `processing` with a lapsed claim lease. The returned job is
    /// already in `processing` with `worker_id` stamped. Returns `None`
    /// when nothing is runnable or another claimer won the race; callers
    /// retry on their next tick.
    async fn claim_next(&self, worker_id: &str) -> Result<Option<Job>>;

    /// Failed jobs whose retry time has elapsed, soonest first
    async fn retryable(&self) -> Result<Vec<Job>>;

    /// Jobs in the dead letter queue, newest first
    async fn dlq(&self) -> Result<Vec<Job>>;
}
