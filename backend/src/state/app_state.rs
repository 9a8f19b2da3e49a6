//! Shared request-handler state
//!
//! Handles to the message store, media store and page source, injected into
//! every handler through axum's `State` extractor.

use crate::config::Config;
use crate::services::PageSource;
use crate::status::Lifecycle;
use crate::store::{MediaStore, MessageStore, StoreError};
use std::sync::Arc;

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Append-only chat log
    pub messages: Arc<MessageStore>,
    /// Uploaded photos
    pub media: Arc<MediaStore>,
    /// Source of the chat page
    pub page: Arc<PageSource>,
    /// Shared HTTP client (connection pooling)
    pub http: reqwest::Client,
    /// Service lifecycle, reported by the health endpoint
    pub lifecycle: Lifecycle,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl AppState {
    /// Open the stores named in `config`
    pub fn from_config(config: &Config, lifecycle: Lifecycle) -> Result<Self, StoreError> {
        Ok(Self {
            messages: Arc::new(MessageStore::open(config.storage.chat_path())?),
            media: Arc::new(MediaStore::open(config.storage.photo_path())?),
            page: Arc::new(PageSource::from_config(&config.page)),
            http: reqwest::Client::new(),
            lifecycle,
            max_body_bytes: config.server.max_body_bytes,
        })
    }
}
