//! Credential and identity provisioning
//!
//! The status publisher needs an access token and an author identity.
//! Both are supplied from outside the process before the service starts.

use crate::config::StatusConfig;
use crate::status::error::StatusError;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// An access token that never prints itself
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a token
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for building authenticated requests
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the token in `text`
    pub fn scrub(&self, text: &str) -> String {
        if self.0.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.0, "***")
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Who status updates are attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Contact address (email)
    pub contact: String,
}

/// Source of the publication credential and identity
pub trait CredentialSource: Send + Sync {
    /// Obtain the access token
    fn get_credential(&self) -> Result<Secret, StatusError>;

    /// Obtain the author identity
    fn get_identity(&self) -> Result<Identity, StatusError>;
}

/// Credentials from configuration: a token value, or a file holding one
pub struct EnvCredentials {
    token: Option<String>,
    token_file: Option<PathBuf>,
    remove_token_file: bool,
    name: Option<String>,
    contact: Option<String>,
}

impl EnvCredentials {
    /// Build from the status section of the configuration
    pub fn from_config(config: &StatusConfig) -> Self {
        Self {
            token: config.token.clone(),
            token_file: config.token_file.clone(),
            remove_token_file: config.remove_token_file,
            name: config.user.clone(),
            contact: config.email.clone(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn get_credential(&self) -> Result<Secret, StatusError> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Secret::new(token));
        }

        let path = self.token_file.as_ref().ok_or_else(|| {
            StatusError::CredentialUnavailable(
                "neither STATUS_TOKEN nor STATUS_TOKEN_FILE is set".to_string(),
            )
        })?;

        let contents = std::fs::read_to_string(path).map_err(|e| {
            StatusError::CredentialUnavailable(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        if self.remove_token_file {
            match std::fs::remove_file(path) {
                Ok(()) => info!("Removed token file {}", path.display()),
                Err(e) => warn!("Failed to remove token file {}: {}", path.display(), e),
            }
        }

        let token = contents.trim();
        if token.is_empty() {
            return Err(StatusError::CredentialUnavailable(format!(
                "{} is empty",
                path.display()
            )));
        }

        Ok(Secret::new(token))
    }

    fn get_identity(&self) -> Result<Identity, StatusError> {
        match (&self.name, &self.contact) {
            (Some(name), Some(contact)) => Ok(Identity {
                name: name.clone(),
                contact: contact.clone(),
            }),
            _ => Err(StatusError::IdentityUnavailable(
                "STATUS_USER and STATUS_EMAIL must both be set".to_string(),
            )),
        }
    }
}
