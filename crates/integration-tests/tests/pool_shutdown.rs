// Pool lifecycle: parallel startup and graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use dispatchq_core::application::{shutdown_channel, Worker, WorkerPool};
use dispatchq_core::domain::JobState;
use dispatchq_core::port::command_runner::mocks::MockCommandRunner;
use dispatchq_core::port::JobStore;
use dispatchq_integration_tests::test_queue;

#[tokio::test]
async fn pool_stops_all_workers_on_shutdown() {
    let q = test_queue().await;
    let runner = Arc::new(MockCommandRunner::new_success("ok\n"));

    let pool = WorkerPool::new(q.store.clone(), runner, q.clock.clone(), 2.0, 3);
    let ids = pool.start();
    assert_eq!(ids.len(), 3);
    for id in &ids {
        assert_eq!(id.len(), 8);
    }

    // Let the workers idle through a few ticks, then stop them
    tokio::time::sleep(Duration::from_millis(150)).await;
    pool.shutdown();

    tokio::time::timeout(Duration::from_secs(2), pool.wait())
        .await
        .expect("pool should stop within 2 seconds");
}

#[tokio::test]
async fn run_loop_processes_jobs_until_shutdown() {
    let q = test_queue().await;
    q.enqueue("looped", "anything", 3).await;

    let runner = Arc::new(MockCommandRunner::new_success("ok\n"));
    let worker = Worker::new(q.store.clone(), runner, q.clock.clone(), 2.0);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    // The 1-second tick should pick the job up on its first poll
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    shutdown_tx.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("worker should stop within 2 seconds");
    result.unwrap().unwrap();

    let job = q.store.get(&"looped".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Completed);
}

#[tokio::test]
async fn no_claims_after_shutdown_signal() {
    let q = test_queue().await;

    let runner = Arc::new(MockCommandRunner::new_success("ok\n"));
    let pool = WorkerPool::new(q.store.clone(), runner, q.clock.clone(), 2.0, 2);
    pool.start();

    // Stop before any tick elapses, then enqueue
    pool.shutdown();
    pool.wait().await;

    q.enqueue("late", "echo hi", 3).await;
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    let job = q.store.get(&"late".to_string()).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Pending);
}
