//! Status side-channel error types
//!
//! None of these reach chat clients; they are logged and the step is skipped.

use thiserror::Error;

/// Errors raised by the credential, tunnel and publication collaborators
#[derive(Error, Debug)]
pub enum StatusError {
    /// No usable credential could be obtained
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    /// Author identity for status commits is incomplete
    #[error("Identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// The tunnel process could not be started
    #[error("Failed to start tunnel: {0}")]
    TunnelSpawn(#[from] std::io::Error),

    /// Publishing the status document failed, including failed git commands
    ///
    /// The message never contains the credential.
    #[error("Status publication failed: {0}")]
    PublishFailed(String),
}
