//! Service lifecycle state
//!
//! `Starting -> AwaitingPublicUrl -> Online -> Stopping -> Stopped`.
//! `Stopped` is terminal; no state is ever re-entered.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Phase of the service lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Listener not yet bound
    Starting,
    /// Waiting (bounded) for the tunnel to report a public URL
    AwaitingPublicUrl,
    /// Serving requests
    Online,
    /// Shutdown requested, offline status being published
    Stopping,
    /// Terminal
    Stopped,
}

impl ServiceState {
    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(self, next: ServiceState) -> bool {
        use ServiceState::*;
        matches!(
            (self, next),
            (Starting, AwaitingPublicUrl)
                | (Starting, Online)
                | (AwaitingPublicUrl, Online)
                | (Starting, Stopping)
                | (AwaitingPublicUrl, Stopping)
                | (Online, Stopping)
                | (Stopping, Stopped)
        )
    }
}

/// Shared handle to the current lifecycle state
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<RwLock<ServiceState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Start in `Starting`
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ServiceState::Starting)),
        }
    }

    /// Current state
    pub async fn current(&self) -> ServiceState {
        *self.state.read().await
    }

    /// Move to `next` if legal; returns whether the state changed
    pub async fn transition(&self, next: ServiceState) -> bool {
        let mut state = self.state.write().await;
        if state.can_transition_to(next) {
            info!(from = ?*state, to = ?next, "Lifecycle transition");
            *state = next;
            true
        } else {
            warn!(from = ?*state, to = ?next, "Ignoring illegal lifecycle transition");
            false
        }
    }
}
