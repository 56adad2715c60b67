// Shell command runner
// Spawns `sh -c <command>` with a hard wall-clock timeout and captures output

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use dispatchq_core::application::worker::constants::EXECUTION_TIMEOUT;
use dispatchq_core::port::{CommandOutcome, CommandRunner};

/// Runs one shell command line per call.
///
/// Exit codes are not interpreted beyond success/failure, and no retrying
/// happens here: retry policy belongs to the worker.
pub struct ShellCommandRunner {
    timeout: Duration,
}

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self {
            timeout: EXECUTION_TIMEOUT,
        }
    }

    /// Custom timeout, for tests
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str) -> CommandOutcome {
        debug!(command = %command, "spawning subshell");

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reap the subprocess if the timeout drops the wait future
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::failure("", format!("failed to spawn command: {e}"));
            }
        };

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return CommandOutcome::failure("", format!("failed to read command output: {e}"));
            }
            Err(_) => {
                return CommandOutcome::failure(
                    "",
                    format!("command timed out after {}s", self.timeout.as_secs()),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            CommandOutcome::success(stdout)
        } else {
            let mut combined = stdout;
            if !stderr.is_empty() {
                combined.push_str("\nSTDERR:\n");
                combined.push_str(&stderr);
            }
            let detail = match output.status.code() {
                Some(code) => format!("command exited with non-zero status: {code}"),
                None => "command terminated by signal".to_string(),
            };
            CommandOutcome::failure(combined, detail)
        }
    }
}
