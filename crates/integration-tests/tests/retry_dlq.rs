// Retry scheduling, DLQ routing and administrative recovery

use std::sync::Arc;

use chrono::Duration;

use dispatchq_core::application::Worker;
use dispatchq_core::domain::JobState;
use dispatchq_core::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
use dispatchq_core::port::{Clock, JobStore};
use dispatchq_integration_tests::test_queue;

#[tokio::test]
async fn failing_job_walks_backoff_into_dlq() {
    let q = test_queue().await;
    q.enqueue("doomed", "exit 1", 2).await;

    let runner = Arc::new(MockCommandRunner::new_fail("command exited with non-zero status: 1"));
    let worker = Worker::new(q.store.clone(), runner.clone(), q.clock.clone(), 2.0);

    // First failure: attempts 0 -> 1, delay base^0 = 1s
    assert!(worker.process_next().await.unwrap());
    let job = q.store.get(&"doomed".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.attempts, 1);
    assert_eq!(
        job.next_retry_at.unwrap(),
        q.clock.now() + Duration::seconds(1)
    );

    // Not yet due
    assert!(!worker.process_next().await.unwrap());

    // Second failure: attempts 1 -> 2, delay base^1 = 2s
    q.clock.advance(Duration::seconds(1));
    assert!(worker.process_next().await.unwrap());
    let job = q.store.get(&"doomed".to_string()).await.unwrap().unwrap();
    assert_eq!(job.attempts, 2);
    assert_eq!(
        job.next_retry_at.unwrap(),
        q.clock.now() + Duration::seconds(2)
    );

    // One second is not enough for the 2s delay
    q.clock.advance(Duration::seconds(1));
    assert!(!worker.process_next().await.unwrap());

    // Third failure exhausts retries: dead with attempts = max_retries + 1
    q.clock.advance(Duration::seconds(1));
    assert!(worker.process_next().await.unwrap());
    let job = q.store.get(&"doomed".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Dead);
    assert_eq!(job.attempts, 3);
    assert!(job.error.is_some());
    assert!(job.next_retry_at.is_none());

    // Exactly three executions happened
    assert_eq!(runner.call_count(), 3);

    // Dead jobs are not claimable
    q.clock.advance(Duration::seconds(3600));
    assert!(!worker.process_next().await.unwrap());
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let q = test_queue().await;
    q.enqueue("flaky", "sometimes", 3).await;

    let runner = Arc::new(MockCommandRunner::new(MockBehavior::FailThenSucceed {
        remaining: 1,
        output: "recovered\n".to_string(),
    }));
    let worker = Worker::new(q.store.clone(), runner.clone(), q.clock.clone(), 2.0);

    assert!(worker.process_next().await.unwrap());
    q.clock.advance(Duration::seconds(1));
    assert!(worker.process_next().await.unwrap());

    let job = q.store.get(&"flaky".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.output.as_deref(), Some("recovered\n"));
    // Executions = 1 + recorded failures
    assert_eq!(runner.call_count() as i32, 1 + job.attempts);
}

#[tokio::test]
async fn dead_job_runs_again_after_administrative_retry() {
    let q = test_queue().await;
    q.enqueue("revived", "exit 1", 0).await;

    let runner = Arc::new(MockCommandRunner::new_fail("boom"));
    let worker = Worker::new(q.store.clone(), runner.clone(), q.clock.clone(), 2.0);

    // max_retries = 0: first failure goes straight to the DLQ
    assert!(worker.process_next().await.unwrap());
    let mut job = q.store.get(&"revived".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Dead);
    assert_eq!(job.attempts, 1);

    // Administrative retry resets the slate
    job.reset_for_retry(q.clock.now()).unwrap();
    q.store.save(&job).await.unwrap();
    let reset = q.store.get(&"revived".to_string()).await.unwrap().unwrap();
    assert_eq!(reset.state, JobState::Pending);
    assert_eq!(reset.attempts, 0);
    assert!(reset.error.is_none());
    assert!(reset.next_retry_at.is_none());

    // And the next claim executes it
    runner.set_behavior(MockBehavior::Success("ok\n".to_string()));
    assert!(worker.process_next().await.unwrap());
    let job = q.store.get(&"revived".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.attempts, 0);
}

#[tokio::test]
async fn backoff_delay_caps_at_one_hour() {
    let q = test_queue().await;
    q.enqueue("slow", "exit 1", 20).await;

    let runner = Arc::new(MockCommandRunner::new_fail("boom"));
    let worker = Worker::new(q.store.clone(), runner, q.clock.clone(), 10.0);

    // Walk failures until the computed delay saturates: 10^4 > 3600
    for _ in 0..5 {
        assert!(worker.process_next().await.unwrap());
        let job = q.store.get(&"slow".to_string()).await.unwrap().unwrap();
        let delay = job.next_retry_at.unwrap() - q.clock.now();
        assert!(delay <= Duration::seconds(3600));
        q.clock.advance(delay);
    }

    let job = q.store.get(&"slow".to_string()).await.unwrap().unwrap();
    assert_eq!(job.attempts, 5);
    // Fifth failure used attempts = 4: min(10^4, 3600) = 3600
    assert_eq!(
        job.next_retry_at.unwrap(),
        q.clock.now() + Duration::seconds(3600)
    );
}
