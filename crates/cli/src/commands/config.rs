//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use colored::Colorize;

use dispatchq_core::Result;

use crate::config::Config;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// One of: max_retries, backoff_base, db_path, worker_count
        key: String,
    },
    /// Set a configuration value and persist it to disk
    Set {
        key: String,
        value: String,
    },
    /// List all configuration values
    List,
}

pub fn execute(cfg: &mut Config, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommand::Get { key } => {
            println!("{key} = {}", cfg.get(key)?);
        }

        ConfigCommand::Set { key, value } => {
            cfg.set_value(key, value)?;
            cfg.save()?;
            println!(
                "{}",
                format!("✓ Configuration updated: {key} = {value}").green()
            );
            println!("Config saved to: {}", Config::path());
        }

        ConfigCommand::List => {
            println!("{}", "=== Configuration ===".bold());
            println!();
            println!("max_retries  = {}", cfg.max_retries);
            println!("backoff_base = {:.1}", cfg.backoff_base);
            println!("db_path      = {}", cfg.db_path);
            println!("worker_count = {}", cfg.worker_count);
            println!();
            println!("Config file: {}", Config::path());
        }
    }

    Ok(())
}
