// Concurrency: atomic claims and parallel worker drains

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use dispatchq_core::application::Worker;
use dispatchq_core::domain::JobState;
use dispatchq_core::port::command_runner::mocks::MockCommandRunner;
use dispatchq_core::port::JobStore;
use dispatchq_integration_tests::test_queue;

#[tokio::test]
async fn concurrent_claims_never_hand_out_the_same_job() {
    let q = test_queue().await;
    for i in 0..6 {
        q.enqueue(&format!("job-{i}"), "echo hi", 3).await;
    }

    let mut tasks = JoinSet::new();
    for w in 0..3 {
        let store = q.store.clone();
        tasks.spawn(async move {
            let worker_id = format!("claimer-{w}");
            let mut claimed = Vec::new();
            for _ in 0..20 {
                match store.claim_next(&worker_id).await {
                    Ok(Some(job)) => claimed.push(job.id),
                    Ok(None) => {}
                    // Transient write contention surfaces as a store error;
                    // real workers retry on their next tick, so do we
                    Err(_) => {}
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            claimed
        });
    }

    let mut all_claimed = Vec::new();
    while let Some(result) = tasks.join_next().await {
        all_claimed.extend(result.unwrap());
    }

    let distinct: HashSet<_> = all_claimed.iter().cloned().collect();
    assert_eq!(all_claimed.len(), 6, "every job claimed exactly once");
    assert_eq!(distinct.len(), 6, "no job handed to two claimers");

    // Every claimed row is left in processing with a claimant stamped
    for job in q.store.list(Some(JobState::Processing)).await.unwrap() {
        assert!(job.worker_id.is_some());
        assert!(job.claim_expires_at.is_some());
    }
}

#[tokio::test]
async fn three_workers_drain_six_jobs_without_overlap() {
    let q = test_queue().await;
    for i in 0..6 {
        q.enqueue(&format!("job-{i}"), "echo hi", 3).await;
    }

    let mut tasks = JoinSet::new();
    for _ in 0..3 {
        let store = q.store.clone();
        let clock = q.clock.clone();
        tasks.spawn(async move {
            let runner = Arc::new(MockCommandRunner::new_success("done\n"));
            let worker = Worker::new(store, runner, clock, 2.0);

            let mut processed = 0;
            for _ in 0..20 {
                match worker.process_next().await {
                    Ok(true) => processed += 1,
                    Ok(false) => {}
                    Err(_) => {} // retry next iteration, like the run loop
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            processed
        });
    }

    let mut total = 0;
    while let Some(result) = tasks.join_next().await {
        total += result.unwrap();
    }

    assert_eq!(total, 6, "six executions across the pool, no duplicates");

    let stats = q.store.stats().await.unwrap();
    assert_eq!(stats.get(&JobState::Completed), Some(&6));
    assert_eq!(stats.get(&JobState::Processing), None);
    assert_eq!(stats.get(&JobState::Pending), None);
}
