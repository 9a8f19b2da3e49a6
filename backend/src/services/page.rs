//! Chat page source
//!
//! The page served at `/` is not part of this service: it is fetched from a
//! remote URL (or read from a local file) on every request and passed through.

use crate::config::PageConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Where the chat page comes from
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Fetched over HTTP
    Remote {
        /// Page URL
        url: String,
        /// Fetch timeout
        timeout: Duration,
    },
    /// Read from disk
    Local(PathBuf),
}

impl PageSource {
    /// Pick the source from configuration; a local file wins over the URL
    pub fn from_config(config: &PageConfig) -> Self {
        match &config.file {
            Some(path) => PageSource::Local(path.clone()),
            None => PageSource::Remote {
                url: config.url.clone(),
                timeout: config.timeout(),
            },
        }
    }

    /// Load the page, rendering a short error document if that fails
    pub async fn fetch(&self, client: &reqwest::Client) -> String {
        match self.try_fetch(client).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Failed to fetch chat page");
                format!("<h3>Failed to fetch HTML: {}</h3>", escape_html(&e))
            }
        }
    }

    async fn try_fetch(&self, client: &reqwest::Client) -> Result<String, String> {
        match self {
            PageSource::Remote { url, timeout } => {
                let response = client
                    .get(url)
                    .timeout(*timeout)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| e.to_string())?;
                response.text().await.map_err(|e| e.to_string())
            }
            PageSource::Local(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| format!("{}: {}", path.display(), e)),
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
