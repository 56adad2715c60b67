//! Shared helpers for cross-crate tests: a file-backed store on a tempdir
//! and a manually advanced clock.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use dispatchq_core::domain::Job;
use dispatchq_core::port::clock::mocks::ManualClock;
use dispatchq_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

pub struct TestQueue {
    pub store: Arc<SqliteJobStore>,
    pub clock: Arc<ManualClock>,
    // Keeps the database file alive for the duration of the test
    _dir: tempfile::TempDir,
}

/// Fixed, whole-second start instant so timestamps survive storage untouched
pub fn start_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

pub async fn test_queue() -> TestQueue {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobs.db");

    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let clock = Arc::new(ManualClock::new(start_time()));
    let store = Arc::new(SqliteJobStore::new(pool, clock.clone()));

    TestQueue {
        store,
        clock,
        _dir: dir,
    }
}

impl TestQueue {
    /// Insert a pending job created "now"
    pub async fn enqueue(&self, id: &str, command: &str, max_retries: i32) -> Job {
        use dispatchq_core::port::{Clock, JobStore};

        let job = Job::new(id, command, max_retries, self.clock.now());
        self.store.save(&job).await.unwrap();
        job
    }
}
