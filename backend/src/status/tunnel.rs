//! Public address via a tunnel process
//!
//! The tunnel (cloudflared by default) is spawned with its output captured
//! to a log file; the public URL is scraped from that log.

use crate::status::error::StatusError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

static TUNNEL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://[a-z0-9\-]+\.trycloudflare\.com").expect("tunnel URL pattern is valid")
});

/// Outcome of waiting for the public URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlWait {
    /// The tunnel reported this URL
    Found(String),
    /// No URL appeared within the bound
    TimedOut,
}

impl UrlWait {
    /// The URL, if one was found
    pub fn url(&self) -> Option<&str> {
        match self {
            UrlWait::Found(url) => Some(url),
            UrlWait::TimedOut => None,
        }
    }
}

/// Anything that can produce the service's public URL
#[async_trait]
pub trait UrlSource: Send + Sync {
    /// Wait at most `wait` for the URL
    ///
    /// Dropping the returned future cancels the wait.
    async fn await_public_url(&self, wait: Duration) -> UrlWait;
}

/// First tunnel URL mentioned in `text`
pub fn find_public_url(text: &str) -> Option<String> {
    TUNNEL_URL.find(text).map(|m| m.as_str().to_string())
}

/// Polls a log file for a tunnel URL
#[derive(Debug, Clone)]
pub struct LogWatcher {
    path: PathBuf,
    poll: Duration,
}

impl LogWatcher {
    /// Watch `path`, re-reading it every `poll`
    pub fn new(path: impl Into<PathBuf>, poll: Duration) -> Self {
        Self {
            path: path.into(),
            poll,
        }
    }

    async fn poll_until_found(&self) -> String {
        let mut ticker = tokio::time::interval(self.poll);
        loop {
            ticker.tick().await;
            // Not existing yet is normal while the tunnel starts
            let Ok(bytes) = tokio::fs::read(&self.path).await else {
                continue;
            };
            if let Some(url) = find_public_url(&String::from_utf8_lossy(&bytes)) {
                return url;
            }
        }
    }
}

#[async_trait]
impl UrlSource for LogWatcher {
    async fn await_public_url(&self, wait: Duration) -> UrlWait {
        match tokio::time::timeout(wait, self.poll_until_found()).await {
            Ok(url) => {
                info!(url = %url, "Public URL found");
                UrlWait::Found(url)
            }
            Err(_) => {
                warn!(
                    log = %self.path.display(),
                    wait_secs = wait.as_secs(),
                    "Could not find public URL"
                );
                UrlWait::TimedOut
            }
        }
    }
}

/// A running tunnel process
///
/// The process is killed when this value is dropped.
pub struct TunnelProcess {
    child: Child,
    watcher: LogWatcher,
}

impl TunnelProcess {
    /// Spawn `<program> tunnel --url http://localhost:<port> --no-autoupdate`
    ///
    /// stdout and stderr both go to `log_path`, which is truncated first.
    pub fn spawn(
        program: &str,
        local_port: u16,
        log_path: &Path,
        poll: Duration,
    ) -> Result<Self, StatusError> {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let log = std::fs::File::create(log_path)?;
        let log_err = log.try_clone()?;

        let local_url = format!("http://localhost:{}", local_port);
        let child = Command::new(program)
            .args(["tunnel", "--url", &local_url, "--no-autoupdate"])
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .kill_on_drop(true)
            .spawn()?;

        info!(
            program = %program,
            pid = ?child.id(),
            local_url = %local_url,
            log = %log_path.display(),
            "Tunnel started"
        );

        Ok(Self {
            child,
            watcher: LogWatcher::new(log_path, poll),
        })
    }

    /// Resolve when the tunnel process exits on its own
    pub async fn wait_exit(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Kill the tunnel and reap it
    pub async fn shutdown(mut self) {
        match self.child.kill().await {
            Ok(()) => debug!("Tunnel process stopped"),
            Err(e) => warn!("Failed to stop tunnel process: {}", e),
        }
    }
}

#[async_trait]
impl UrlSource for TunnelProcess {
    async fn await_public_url(&self, wait: Duration) -> UrlWait {
        self.watcher.await_public_url(wait).await
    }
}
