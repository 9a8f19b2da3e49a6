//! Online/offline status as a scoped resource
//!
//! A `StatusGuard` is created once the listener is bound. `go_online`
//! publishes the online status; `release` publishes offline exactly once.
//! If the guard is dropped without `release` (early return, panic), an
//! offline publication is still scheduled on the current runtime.
//!
//! That fallback is best-effort. It only runs if the runtime keeps going
//! after the drop: when the `main` future itself panics, the runtime is torn
//! down with it and the spawned publication never executes. Panics in the
//! server task do not hit this path; `main` observes them as a `JoinError`
//! and still calls `release`.

use crate::status::lifecycle::{Lifecycle, ServiceState};
use crate::status::publisher::StatusPublisher;
use crate::status::tunnel::UrlWait;
use std::sync::Arc;
use tracing::{info, warn};

/// Guarantees an offline publication for every online session
pub struct StatusGuard {
    publisher: Option<Arc<dyn StatusPublisher>>,
    lifecycle: Lifecycle,
    released: bool,
}

impl StatusGuard {
    /// Create a guard; `publisher` is `None` when no credential was obtained
    pub fn new(publisher: Option<Arc<dyn StatusPublisher>>, lifecycle: Lifecycle) -> Self {
        if publisher.is_none() {
            warn!("No status publisher available, status updates will be skipped");
        }
        Self {
            publisher,
            lifecycle,
            released: false,
        }
    }

    /// Enter `Online` and publish the URL if one was found
    ///
    /// Publication failures are logged, never returned.
    /// Returns whether the online status was published.
    pub async fn go_online(&mut self, wait: &UrlWait) -> bool {
        self.lifecycle.transition(ServiceState::Online).await;

        let url = match wait {
            UrlWait::Found(url) => url,
            UrlWait::TimedOut => {
                warn!("No public URL, skipping online status update");
                return false;
            }
        };

        let Some(publisher) = &self.publisher else {
            warn!(url = %url, "Missing credential, skipping online status update");
            return false;
        };

        info!(url = %url, "Publishing online status");
        match publisher.publish_status(Some(url), true).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to publish online status");
                false
            }
        }
    }

    /// Publish offline (best-effort) and move to `Stopped`
    pub async fn release(mut self) {
        self.released = true;
        self.lifecycle.transition(ServiceState::Stopping).await;

        if let Some(publisher) = &self.publisher {
            info!("Publishing offline status");
            if let Err(e) = publisher.publish_status(None, false).await {
                warn!(error = %e, "Failed to publish offline status");
            }
        }

        self.lifecycle.transition(ServiceState::Stopped).await;
    }
}

impl Drop for StatusGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if std::thread::panicking() {
            warn!("Status guard dropped during a panic, offline status may not be published");
        } else {
            warn!("Status guard dropped without release");
        }

        let Some(publisher) = self.publisher.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = publisher.publish_status(None, false).await {
                        warn!(error = %e, "Failed to publish offline status");
                    }
                });
            }
            Err(_) => warn!("No runtime available, offline status not published"),
        }
    }
}
