// Dispatchq Infrastructure - System Adapter
// Implements the CommandRunner port with a `sh -c` subprocess

mod shell_runner;

pub use shell_runner::ShellCommandRunner;
