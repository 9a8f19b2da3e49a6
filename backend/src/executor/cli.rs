//! Command runner implementation
//!
//! Spawns a process, waits for it under a timeout, and captures its stdout.

use crate::executor::error::ExecutionError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

/// Runs external commands with a default timeout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    /// Default timeout for process execution
    default_timeout: Duration,
}

impl CommandRunner {
    /// Create a new runner with the given timeout in seconds
    pub fn new(default_timeout_secs: u64) -> Self {
        Self {
            default_timeout: Duration::from_secs(default_timeout_secs),
        }
    }

    /// Get the default timeout duration
    #[cfg(test)]
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `program` with `args`, optionally inside `cwd`
    ///
    /// Arguments are not logged since they may carry credentials.
    ///
    /// # Returns
    /// * `Ok(String)` - The stdout output of the process
    /// * `Err(ExecutionError)` - If the process could not run, failed, or timed out
    pub async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, ExecutionError> {
        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!(program = %program, args_len = args.len(), "Spawning process");

        match timeout(self.default_timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    String::from_utf8(output.stdout).map_err(|e| {
                        ExecutionError::InvalidEncoding(format!("Failed to decode stdout: {}", e))
                    })
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let exit_code = output.status.code().unwrap_or(-1);

                    Err(ExecutionError::ProcessFailed(format!(
                        "{} exited with code {}: {}",
                        program,
                        exit_code,
                        stderr.trim()
                    )))
                }
            }
            Ok(Err(e)) => {
                error!(program = %program, error = %e, "Failed to spawn process");
                Err(ExecutionError::SpawnFailed(e))
            }
            Err(_) => {
                error!(
                    program = %program,
                    timeout_secs = self.default_timeout.as_secs(),
                    "Process execution timed out"
                );
                Err(ExecutionError::Timeout(self.default_timeout.as_secs()))
            }
        }
    }
}
