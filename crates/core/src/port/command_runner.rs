// Command Runner Port
// Abstraction over executing one shell command with a bounded timeout

use async_trait::async_trait;

/// Result of a command execution.
///
/// Runners never fail as such: spawn errors, timeouts and non-zero exits
/// all come back as unsuccessful outcomes with a populated `error`.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    /// Captured stdout on success; stdout plus delimited stderr on failure
    pub output: String,
    /// Failure detail (exit status, timeout, spawn error)
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner (infra-system): `sh -c` subprocess with timeout
/// - MockCommandRunner (tests): scripted outcomes
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run one command line to completion (or timeout) and capture output
    async fn run(&self, command: &str) -> CommandOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed with the given output
        Success(String),
        /// Always fail with the given error detail
        Fail(String),
        /// Fail `remaining` times, then succeed with the given output
        FailThenSucceed { remaining: usize, output: String },
    }

    /// Mock Command Runner for testing
    pub struct MockCommandRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockCommandRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_success(output: impl Into<String>) -> Self {
            Self::new(MockBehavior::Success(output.into()))
        }

        pub fn new_fail(error: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(error.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, _command: &str) -> CommandOutcome {
            *self.call_count.lock().unwrap() += 1;

            let mut behavior = self.behavior.lock().unwrap();
            match &mut *behavior {
                MockBehavior::Success(output) => CommandOutcome::success(output.clone()),
                MockBehavior::Fail(error) => CommandOutcome::failure("", error.clone()),
                MockBehavior::FailThenSucceed { remaining, output } => {
                    if *remaining == 0 {
                        CommandOutcome::success(output.clone())
                    } else {
                        *remaining -= 1;
                        CommandOutcome::failure("", "scripted failure")
                    }
                }
            }
        }
    }
}
