// Worker Pool - fan-out supervisor with graceful shutdown

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
use crate::error::Result;
use crate::port::{Clock, CommandRunner, JobStore};

/// Supervises N workers over one shared store.
///
/// Workers stop independently and in parallel on shutdown; `wait` returns
/// only once every one of them has reported done.
pub struct WorkerPool {
    store: Arc<dyn JobStore>,
    runner: Arc<dyn CommandRunner>,
    clock: Arc<dyn Clock>,
    backoff_base: f64,
    count: usize,
    shutdown_tx: ShutdownSender,
    shutdown_rx: ShutdownToken,
    // Guards start/stop bookkeeping only; workers coordinate through the store
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<dyn CommandRunner>,
        clock: Arc<dyn Clock>,
        backoff_base: f64,
        count: usize,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        Self {
            store,
            runner,
            clock,
            backoff_base,
            count,
            shutdown_tx,
            shutdown_rx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Launch all workers in parallel; returns their ids
    pub fn start(&self) -> Vec<String> {
        let mut handles = self.handles.lock().unwrap();
        let mut ids = Vec::with_capacity(self.count);

        for _ in 0..self.count {
            let worker = Worker::new(
                Arc::clone(&self.store),
                Arc::clone(&self.runner),
                Arc::clone(&self.clock),
                self.backoff_base,
            );
            let worker_id = worker.id().to_string();
            ids.push(worker_id.clone());

            let token = self.shutdown_rx.clone();
            handles.push(tokio::spawn(async move {
                if let Err(e) = worker.run(token).await {
                    error!(worker_id = %worker_id, error = %e, "worker failed");
                }
            }));
        }

        info!(count = self.count, "workers started");
        ids
    }

    /// Broadcast cancellation to all workers
    pub fn shutdown(&self) {
        self.shutdown_tx.shutdown();
    }

    /// Wait until every worker has stopped
    pub async fn wait(&self) {
        let handles: Vec<_> = self.handles.lock().unwrap().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        info!("all workers stopped");
    }

    /// Block until an interrupt or termination signal, then drive a
    /// graceful stop: no new claims, in-flight commands run to completion.
    pub async fn run_until_signal(&self) -> Result<()> {
        wait_for_signal().await?;
        info!("shutdown signal received, stopping workers");
        self.shutdown();
        self.wait().await;
        Ok(())
    }
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
