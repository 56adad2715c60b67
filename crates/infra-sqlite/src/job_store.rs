// SQLite JobStore Implementation
//
// All coordination between workers funnels through this adapter: claims are
// a short transaction whose conditional update is the race arbiter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::SqlitePool;

use dispatchq_core::application::worker::constants::CLAIM_LEASE_SECS;
use dispatchq_core::domain::{Job, JobId, JobState};
use dispatchq_core::error::{AppError, Result};
use dispatchq_core::port::{Clock, JobStore};

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();
                match code_str {
                    // SQLite error codes: https://www.sqlite.org/rescode.html
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

/// Fixed-width RFC 3339 UTC rendering; lexicographic order matches
/// chronological order, so SQL range predicates compare correctly as text.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("invalid timestamp {raw:?}: {e}")))
}

pub struct SqliteJobStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn save(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, command, state, attempts, max_retries,
                created_at, updated_at, next_retry_at,
                worker_id, claim_expires_at, error, output
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                command = excluded.command,
                state = excluded.state,
                attempts = excluded.attempts,
                max_retries = excluded.max_retries,
                updated_at = excluded.updated_at,
                next_retry_at = excluded.next_retry_at,
                worker_id = excluded.worker_id,
                claim_expires_at = excluded.claim_expires_at,
                error = excluded.error,
                output = excluded.output
            "#,
        )
        .bind(&job.id)
        .bind(&job.command)
        .bind(job.state.as_str())
        .bind(job.attempts)
        .bind(job.max_retries)
        .bind(format_ts(job.created_at))
        .bind(format_ts(job.updated_at))
        .bind(job.next_retry_at.map(format_ts))
        .bind(&job.worker_id)
        .bind(job.claim_expires_at.map(format_ts))
        .bind(&job.error)
        .bind(&job.output)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list(&self, state: Option<JobState>) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = match state {
            Some(state) => {
                sqlx::query_as("SELECT * FROM jobs WHERE state = ? ORDER BY created_at DESC")
                    .bind(state.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn stats(&self) -> Result<HashMap<JobState, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT state, COUNT(*) FROM jobs GROUP BY state")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let mut stats = HashMap::new();
        for (state, count) in rows {
            stats.insert(state.parse::<JobState>()?, count);
        }
        Ok(stats)
    }

    async fn delete(&self, id: &JobId) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn claim_next(&self, worker_id: &str) -> Result<Option<Job>> {
        let now = self.clock.now();
        let now_str = format_ts(now);

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Oldest runnable job: pending, failed past its retry time, or
        // processing with a lapsed claim lease (crashed claimant)
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE state = ?
               OR (state = ? AND next_retry_at <= ?)
               OR (state = ? AND claim_expires_at <= ?)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(JobState::Pending.as_str())
        .bind(JobState::Failed.as_str())
        .bind(&now_str)
        .bind(JobState::Processing.as_str())
        .bind(&now_str)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(None);
        };
        let mut job = row.into_job()?;

        // Conditional update is the race arbiter: zero rows affected means
        // another claimer won between our select and this write.
        let lease_until = now + Duration::seconds(CLAIM_LEASE_SECS);
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET state = ?, worker_id = ?, claim_expires_at = ?,
                next_retry_at = NULL, updated_at = ?
            WHERE id = ?
              AND (state IN (?, ?) OR (state = ? AND claim_expires_at <= ?))
            "#,
        )
        .bind(JobState::Processing.as_str())
        .bind(worker_id)
        .bind(format_ts(lease_until))
        .bind(&now_str)
        .bind(&job.id)
        .bind(JobState::Pending.as_str())
        .bind(JobState::Failed.as_str())
        .bind(JobState::Processing.as_str())
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            // Lost claim: not an error, the caller retries next tick
            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(None);
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        job.mark_processing(worker_id, lease_until, now)?;
        Ok(Some(job))
    }

    async fn retryable(&self) -> Result<Vec<Job>> {
        let now_str = format_ts(self.clock.now());

        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE state = ? AND next_retry_at <= ?
            ORDER BY next_retry_at ASC
            "#,
        )
        .bind(JobState::Failed.as_str())
        .bind(&now_str)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn dlq(&self) -> Result<Vec<Job>> {
        self.list(Some(JobState::Dead)).await
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    command: String,
    state: String,
    attempts: i32,
    max_retries: i32,
    created_at: String,
    updated_at: String,
    next_retry_at: Option<String>,
    worker_id: Option<String>,
    claim_expires_at: Option<String>,
    error: Option<String>,
    output: Option<String>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        Ok(Job {
            id: self.id,
            command: self.command,
            state: self.state.parse::<JobState>()?,
            attempts: self.attempts,
            max_retries: self.max_retries,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
            next_retry_at: self.next_retry_at.as_deref().map(parse_ts).transpose()?,
            worker_id: self.worker_id,
            claim_expires_at: self.claim_expires_at.as_deref().map(parse_ts).transpose()?,
            error: self.error,
            output: self.output,
        })
    }
}
