//! dispatchq - durable background job queue CLI
//!
//! Thin client of the shared SQLite store; `worker start` is the one
//! subcommand that instantiates the worker pool.

mod commands;
mod config;
mod pid;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dispatchq")]
#[command(about = "A durable background job queue with retries and a Dead Letter Queue", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new job to the queue
    Enqueue {
        /// Job JSON, e.g. '{"command":"echo hi","max_retries":5}'
        job: String,
    },
    /// List jobs by state
    List {
        /// Filter by state (pending, processing, completed, failed, dead)
        #[arg(short, long)]
        state: Option<String>,
    },
    /// Show summary of all job states and active workers
    Status,
    /// Manage the Dead Letter Queue
    Dlq(commands::dlq::DlqArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Manage worker processes
    Worker(commands::worker::WorkerArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Workers log their lifecycle; the other commands stay quiet unless asked
    let default_filter = match &cli.command {
        Commands::Worker(_) => "info",
        _ => "warn",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .expect("failed to create env filter");
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let mut cfg = config::Config::load()?;

    match cli.command {
        Commands::Enqueue { job } => commands::enqueue::execute(&cfg, &job).await?,
        Commands::List { state } => commands::list::execute(&cfg, state.as_deref()).await?,
        Commands::Status => commands::status::execute(&cfg).await?,
        Commands::Dlq(args) => commands::dlq::execute(&cfg, &args).await?,
        Commands::Config(args) => commands::config::execute(&mut cfg, &args)?,
        Commands::Worker(args) => commands::worker::execute(&cfg, &args).await?,
    }

    Ok(())
}
