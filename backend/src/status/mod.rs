//! Status side-channel
//!
//! Everything that makes the relay reachable and announces it: the
//! credential used for publication, the tunnel that yields a public URL,
//! the publisher that updates the status document, and the guard that ties
//! online/offline announcements to the service lifetime.

pub mod credentials;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod publisher;
pub mod tunnel;

pub use credentials::{CredentialSource, EnvCredentials, Identity, Secret};
pub use error::StatusError;
pub use guard::StatusGuard;
pub use lifecycle::{Lifecycle, ServiceState};
pub use publisher::{GitStatusPublisher, StatusPublisher};
pub use tunnel::{TunnelProcess, UrlSource, UrlWait};
