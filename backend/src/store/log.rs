//! Append-only chat log
//!
//! One message per line. Appends from concurrent requests are serialized
//! through a single writer lock so lines never interleave.

use crate::store::error::StoreError;
use crate::store::message::{MediaRef, Message};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Flat-file chat log
pub struct MessageStore {
    path: PathBuf,
    /// Held for the duration of each append
    writer: Mutex<()>,
}

impl MessageStore {
    /// Open the log at `path`, creating its parent directory if needed
    ///
    /// The file itself is created lazily on the first append.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Chat log at: {}", path.display());

        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    /// Append a text message
    ///
    /// # Returns
    /// * `Ok(())` - One line was appended
    /// * `Err(StoreError::InvalidInput)` - Body was empty after trimming; nothing written
    /// * `Err(StoreError::Io)` - The append failed
    pub async fn append_text(&self, author: &str, body: &str) -> Result<(), StoreError> {
        let message = Message::text(author, body)?;
        self.append(&message).await
    }

    /// Append a photo message referencing `media_ref`
    ///
    /// The ref is not checked against the media store. Store the media
    /// first so the line never points at bytes that were not written.
    pub async fn append_photo(
        &self,
        author: &str,
        media_ref: &MediaRef,
        caption: Option<&str>,
    ) -> Result<(), StoreError> {
        let message = Message::photo(author, media_ref.clone(), caption);
        self.append(&message).await
    }

    /// Append one encoded message as a single write
    pub async fn append(&self, message: &Message) -> Result<(), StoreError> {
        let line = message.to_line();

        let _guard = self.writer.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(author = %message.author, bytes = line.len(), "Appended message");
        Ok(())
    }

    /// Read the whole log verbatim
    ///
    /// A log that does not exist yet reads as empty.
    pub async fn read_transcript(&self) -> Result<Vec<u8>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
