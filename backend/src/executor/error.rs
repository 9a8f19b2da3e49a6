//! Execution-specific error types
//!
//! Errors that can occur while running an external command (spawning, timeouts, etc.)

use thiserror::Error;

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Process exited with a non-zero exit code
    #[error("Process execution failed: {0}")]
    ProcessFailed(String),

    /// Command execution exceeded the timeout limit
    #[error("Command execution timed out after {0} seconds")]
    Timeout(u64),

    /// Failed to spawn the process (e.g., command not found, permission denied)
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// Process output could not be decoded as UTF-8
    #[error("Invalid output encoding: {0}")]
    InvalidEncoding(String),
}
