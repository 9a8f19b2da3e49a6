//! Request and response bodies shared by the chat endpoints

use crate::store::DEFAULT_AUTHOR;
use serde::{Deserialize, Serialize};

/// Body of `POST /post`
///
/// Every field is optional; a body that does not parse is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct PostMessageRequest {
    /// Message text
    #[serde(default)]
    pub msg: Option<String>,
    /// Display name
    #[serde(default)]
    pub username: Option<String>,
}

/// `{"status":"ok"}`, optionally with the stored photo ref
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Ref of the uploaded photo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl OkResponse {
    /// Plain acknowledgment
    pub fn ok() -> Self {
        Self {
            status: "ok",
            filename: None,
        }
    }

    /// Acknowledgment carrying a photo ref
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            status: "ok",
            filename: Some(filename.into()),
        }
    }
}

/// Use the supplied display name, or `Anon` when it is missing or blank
pub fn author_or_default(username: Option<&str>) -> &str {
    username
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_AUTHOR)
}
