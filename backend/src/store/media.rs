//! Media side-store
//!
//! Uploaded photos are written once under a freshly generated ref and never
//! overwritten.

use crate::store::error::StoreError;
use crate::store::message::MediaRef;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Directory of uploaded media, one file per ref
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Open (and create if missing) the media directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        info!("Media directory at: {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, media_ref: &MediaRef) -> PathBuf {
        self.dir.join(media_ref.as_str())
    }

    /// Store `bytes` under a new ref derived from `original_name`
    ///
    /// # Returns
    /// * `Ok(MediaRef)` - The bytes are fully written and synced
    /// * `Err(StoreError::Io)` - Nothing usable was written under the ref
    pub async fn store_media(
        &self,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<MediaRef, StoreError> {
        let media_ref = MediaRef::generate(original_name);
        let path = self.path_for(&media_ref);

        // create_new keeps refs write-once even on an id collision
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!("Failed to remove partial media file {}: {}", path.display(), cleanup);
            }
            return Err(StoreError::Io(e));
        }

        info!(
            media_ref = %media_ref,
            original_name = %original_name,
            bytes = bytes.len(),
            "Stored media"
        );
        Ok(media_ref)
    }

    /// Read the bytes stored under `raw_ref`
    ///
    /// Refs that were never issued, or that are not plain tokens, are `NotFound`.
    pub async fn read_media(&self, raw_ref: &str) -> Result<Vec<u8>, StoreError> {
        let media_ref =
            MediaRef::parse(raw_ref).ok_or_else(|| StoreError::NotFound(raw_ref.to_string()))?;

        match fs::read(self.path_for(&media_ref)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(raw_ref.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
