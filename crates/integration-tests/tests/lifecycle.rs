// End-to-end lifecycle against a real store and real subshells

use std::sync::Arc;

use dispatchq_core::application::enqueue::{self, EnqueueRequest};
use dispatchq_core::application::Worker;
use dispatchq_core::domain::JobState;
use dispatchq_core::port::id_provider::UuidProvider;
use dispatchq_core::port::JobStore;
use dispatchq_infra_system::ShellCommandRunner;
use dispatchq_integration_tests::{test_queue, TestQueue};

fn shell_worker(q: &TestQueue) -> Worker {
    Worker::new(
        q.store.clone(),
        Arc::new(ShellCommandRunner::new()),
        q.clock.clone(),
        2.0,
    )
}

#[tokio::test]
async fn echo_job_completes_with_output() {
    let q = test_queue().await;

    let req = EnqueueRequest::from_json(r#"{"command":"echo hi"}"#).unwrap();
    let job = enqueue::execute(q.store.as_ref(), &UuidProvider, q.clock.as_ref(), req, 3)
        .await
        .unwrap();
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.id.len(), 36); // canonical uuid rendering

    let worker = shell_worker(&q);
    assert!(worker.process_next().await.unwrap());

    let done = q.store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(done.state, JobState::Completed);
    assert!(done.output.as_deref().unwrap().contains("hi"));
    assert_eq!(done.attempts, 0);
    assert!(done.worker_id.is_none());
    assert!(done.error.is_none());
}

#[tokio::test]
async fn pending_jobs_persist_until_workers_run() {
    let q = test_queue().await;

    q.enqueue("first", "echo one", 3).await;
    q.enqueue("second", "echo two", 3).await;

    let pending = q.store.list(Some(JobState::Pending)).await.unwrap();
    assert_eq!(pending.len(), 2);

    let worker = shell_worker(&q);
    assert!(worker.process_next().await.unwrap());
    assert!(worker.process_next().await.unwrap());
    assert!(!worker.process_next().await.unwrap());

    let stats = q.store.stats().await.unwrap();
    assert_eq!(stats.get(&JobState::Completed), Some(&2));
    assert_eq!(stats.get(&JobState::Pending), None);
    assert_eq!(stats.get(&JobState::Processing), None);
}

#[tokio::test]
async fn jobs_drain_in_fifo_order() {
    let q = test_queue().await;

    q.enqueue("a", "echo a", 3).await;
    q.clock.advance(chrono::Duration::seconds(1));
    q.enqueue("b", "echo b", 3).await;

    let worker = shell_worker(&q);
    let first = q.store.claim_next(worker.id()).await.unwrap().unwrap();
    assert_eq!(first.id, "a");
}

#[tokio::test]
async fn invalid_command_exhausts_to_dlq() {
    let q = test_queue().await;
    q.enqueue("bad", "nonexistent_command_xyz", 1).await;

    let worker = shell_worker(&q);

    assert!(worker.process_next().await.unwrap());
    let after_first = q.store.get(&"bad".to_string()).await.unwrap().unwrap();
    assert_eq!(after_first.state, JobState::Failed);
    assert_eq!(after_first.attempts, 1);

    // First retry is due base^0 = 1s later
    q.clock.advance(chrono::Duration::seconds(1));
    assert!(worker.process_next().await.unwrap());

    let dead = q.store.get(&"bad".to_string()).await.unwrap().unwrap();
    assert_eq!(dead.state, JobState::Dead);
    assert_eq!(dead.attempts, 2);
    assert!(dead.error.as_deref().unwrap().contains("non-zero"));
}
