//! CLI command implementations, one module per subcommand.

pub mod config;
pub mod dlq;
pub mod enqueue;
pub mod list;
pub mod status;
pub mod worker;

use std::sync::Arc;

use dispatchq_core::port::clock::SystemClock;
use dispatchq_core::port::{Clock, JobStore};
use dispatchq_core::Result;
use dispatchq_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

/// Open (and migrate) the shared store every command talks to
pub(crate) async fn open_store(
    cfg: &crate::config::Config,
) -> Result<(Arc<dyn JobStore>, Arc<dyn Clock>)> {
    if let Some(parent) = std::path::Path::new(&cfg.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = create_pool(&cfg.db_path).await?;
    run_migrations(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new(pool, Arc::clone(&clock)));
    Ok((store, clock))
}
