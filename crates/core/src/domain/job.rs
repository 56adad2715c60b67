// Job Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Job ID (UUID v4, or a client-supplied opaque string)
pub type JobId = String;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Dead,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Dead => "dead",
        }
    }

    /// All states, in lifecycle order (used by status rendering and tests)
    pub fn all() -> [JobState; 5] {
        [
            JobState::Pending,
            JobState::Processing,
            JobState::Completed,
            JobState::Failed,
            JobState::Dead,
        ]
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            "dead" => Ok(JobState::Dead),
            other => Err(DomainError::ValidationError(format!(
                "unknown job state: {other} (valid: pending, processing, completed, failed, dead)"
            ))),
        }
    }
}

/// Job Entity
///
/// The sole persisted entity. Mutated only through the transition methods
/// below; invalid transitions are domain errors, never silent no-ops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub command: String,
    pub state: JobState,

    /// Count of failed execution attempts so far
    pub attempts: i32,
    pub max_retries: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Earliest re-claim time; present only in `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,

    /// Current claimant; present only in `processing`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    /// Claim lease deadline; present only in `processing`. A lapsed lease
    /// makes the row claimable again after a worker crash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Job {
    /// Create a new pending job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `command` - Shell command line to execute
    /// * `max_retries` - Tolerated failures before the DLQ
    /// * `created_at` - Creation timestamp (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        command: impl Into<String>,
        max_retries: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            state: JobState::Pending,
            attempts: 0,
            max_retries,
            created_at,
            updated_at: created_at,
            next_retry_at: None,
            worker_id: None,
            claim_expires_at: None,
            error: None,
            output: None,
        }
    }

    /// Whether another failure may still be retried.
    ///
    /// Evaluated against the pre-increment attempt count: the failure that
    /// observes `can_retry() == false` routes the job to the DLQ.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_retries
    }

    /// Whether the job is claimable at `now`
    pub fn is_runnable(&self, now: DateTime<Utc>) -> bool {
        match self.state {
            JobState::Pending => true,
            JobState::Failed => self.next_retry_at.is_some_and(|t| t <= now),
            JobState::Processing => self.claim_expires_at.is_some_and(|t| t <= now),
            _ => false,
        }
    }

    /// Transition to `processing` under a worker claim
    ///
    /// Legal from `pending`, `failed`, or `processing` with a lapsed lease.
    pub fn mark_processing(
        &mut self,
        worker_id: impl Into<String>,
        lease_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let claimable = matches!(self.state, JobState::Pending | JobState::Failed)
            || (self.state == JobState::Processing
                && self.claim_expires_at.is_some_and(|t| t <= now));
        if !claimable {
            return Err(self.invalid_transition(JobState::Processing));
        }
        self.state = JobState::Processing;
        self.worker_id = Some(worker_id.into());
        self.claim_expires_at = Some(lease_until);
        self.next_retry_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Transition to `completed` after a successful execution
    pub fn mark_completed(&mut self, output: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        if self.state != JobState::Processing {
            return Err(self.invalid_transition(JobState::Completed));
        }
        self.state = JobState::Completed;
        self.output = Some(output.into());
        self.error = None;
        self.worker_id = None;
        self.claim_expires_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Record a retryable failure and park the job until `next_retry_at`
    pub fn mark_failed(
        &mut self,
        error: impl Into<String>,
        next_retry_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.state != JobState::Processing || !self.can_retry() {
            return Err(self.invalid_transition(JobState::Failed));
        }
        self.attempts += 1;
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.next_retry_at = Some(next_retry_at);
        self.worker_id = None;
        self.claim_expires_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Record the final failure and move the job to the DLQ
    pub fn mark_dead(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        if self.state != JobState::Processing || self.can_retry() {
            return Err(self.invalid_transition(JobState::Dead));
        }
        self.attempts += 1;
        self.state = JobState::Dead;
        self.error = Some(error.into());
        self.next_retry_at = None;
        self.worker_id = None;
        self.claim_expires_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Administrative reset: move a DLQ job back to `pending` with a clean slate
    pub fn reset_for_retry(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.state != JobState::Dead {
            return Err(self.invalid_transition(JobState::Pending));
        }
        self.state = JobState::Pending;
        self.attempts = 0;
        self.error = None;
        self.next_retry_at = None;
        self.worker_id = None;
        self.claim_expires_at = None;
        self.updated_at = now;
        Ok(())
    }

    fn invalid_transition(&self, to: JobState) -> DomainError {
        DomainError::InvalidStateTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}
