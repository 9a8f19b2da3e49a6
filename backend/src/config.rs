//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Page served at `/` when neither `PAGE_URL` nor `PAGE_FILE` is set
pub const DEFAULT_PAGE_URL: &str =
    "https://raw.githubusercontent.com/archlinuxwithniri/tempchatapp/main/index.html";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Chat log and media locations
    pub storage: StorageConfig,
    /// Where the chat page comes from
    pub page: PageConfig,
    /// Tunnel process settings
    pub tunnel: TunnelConfig,
    /// Status document publication settings
    pub status: StatusConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Largest request body accepted (photo uploads)
    pub max_body_bytes: usize,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory for the log and media
    pub data_dir: PathBuf,
    /// Log file name, relative to `data_dir`
    pub chat_file: String,
    /// Media directory name, relative to `data_dir`
    pub photo_dir: String,
}

/// Page pass-through configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Remote HTML document
    pub url: String,
    /// Local HTML file; takes precedence over `url`
    pub file: Option<PathBuf>,
    /// Timeout for fetching the remote page
    pub timeout_secs: u64,
}

/// Tunnel configuration
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// Tunnel executable; `None` disables the tunnel
    pub command: Option<String>,
    /// File the tunnel's output is captured to
    pub log_path: PathBuf,
    /// Upper bound on waiting for the public URL
    pub wait_secs: u64,
    /// Interval between log polls
    pub poll_ms: u64,
}

/// Status publication configuration
#[derive(Clone)]
pub struct StatusConfig {
    /// Credential given directly
    pub token: Option<String>,
    /// File holding the credential
    pub token_file: Option<PathBuf>,
    /// Delete `token_file` once it has been read
    pub remove_token_file: bool,
    /// Commit author name
    pub user: Option<String>,
    /// Commit author email
    pub email: Option<String>,
    /// Status repository as `owner/name`
    pub repo: Option<String>,
    /// Branch the status document lives on
    pub branch: String,
    /// Local clone of the status repository
    pub checkout_dir: PathBuf,
}

impl std::fmt::Debug for StatusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusConfig")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("token_file", &self.token_file)
            .field("remove_token_file", &self.remove_token_file)
            .field("user", &self.user)
            .field("email", &self.email)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("checkout_dir", &self.checkout_dir)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parse_or = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| ".".to_string()));

        Self {
            server: ServerConfig {
                port: get("PORT")
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(8000),
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                max_body_bytes: parse_or("MAX_BODY_BYTES", 25 * 1024 * 1024) as usize,
            },
            storage: StorageConfig {
                chat_file: get("CHAT_FILE").unwrap_or_else(|| "chat.txt".to_string()),
                photo_dir: get("PHOTO_DIR").unwrap_or_else(|| "photos".to_string()),
                data_dir: data_dir.clone(),
            },
            page: PageConfig {
                url: get("PAGE_URL").unwrap_or_else(|| DEFAULT_PAGE_URL.to_string()),
                file: get("PAGE_FILE").map(PathBuf::from),
                timeout_secs: parse_or("PAGE_TIMEOUT_SECS", 5),
            },
            tunnel: TunnelConfig {
                // Explicitly empty TUNNEL_COMMAND disables the tunnel
                command: match lookup("TUNNEL_COMMAND") {
                    Some(cmd) if cmd.trim().is_empty() => None,
                    Some(cmd) => Some(cmd),
                    None => Some("cloudflared".to_string()),
                },
                log_path: get("TUNNEL_LOG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_dir.join("cloudflared.log")),
                wait_secs: parse_or("TUNNEL_WAIT_SECS", 30),
                poll_ms: parse_or("TUNNEL_POLL_MS", 1000),
            },
            status: StatusConfig {
                token: get("STATUS_TOKEN").map(|t| t.trim().to_string()),
                token_file: get("STATUS_TOKEN_FILE").map(PathBuf::from),
                remove_token_file: get("STATUS_TOKEN_FILE_REMOVE")
                    .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                user: get("STATUS_USER"),
                email: get("STATUS_EMAIL"),
                repo: get("STATUS_REPO"),
                branch: get("STATUS_BRANCH").unwrap_or_else(|| "main".to_string()),
                checkout_dir: get("STATUS_CHECKOUT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_dir.join("status_repo")),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StorageConfig {
    /// Full path of the chat log
    pub fn chat_path(&self) -> PathBuf {
        self.data_dir.join(&self.chat_file)
    }

    /// Full path of the media directory
    pub fn photo_path(&self) -> PathBuf {
        self.data_dir.join(&self.photo_dir)
    }
}

impl PageConfig {
    /// Remote fetch timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TunnelConfig {
    /// Bound on the public URL wait
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Log poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}
