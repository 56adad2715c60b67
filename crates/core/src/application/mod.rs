// Application Layer - Use Cases and Business Logic

pub mod backoff;
pub mod enqueue;
pub mod pool;
pub mod worker;

// Re-exports
pub use pool::WorkerPool;
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
