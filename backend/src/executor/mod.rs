//! Command execution module
//!
//! Runs short-lived external commands (git, for status publication) with
//! output capture, timeout management, and error handling.

pub mod cli;
pub mod error;

pub use cli::CommandRunner;
pub use error::ExecutionError;
