//! Chat message model
//!
//! Defines the message kinds and their single-line log encoding:
//!
//! ```text
//! <author> : <text>
//! <author> : [photo]<ref>
//! <author> : [photo]<ref>|<caption>
//! ```

use crate::store::error::StoreError;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Author used when a client does not supply one
pub const DEFAULT_AUTHOR: &str = "Anon";

/// Separator between author and payload in a log line
pub const AUTHOR_SEPARATOR: &str = " : ";

/// Prefix marking a photo payload
pub const PHOTO_MARKER: &str = "[photo]";

/// Extension used when the uploaded file name has none
const FALLBACK_EXTENSION: &str = "bin";

/// Longest ref accepted from clients
const MAX_REF_LEN: usize = 128;

/// Opaque name of a stored media asset
///
/// Generated refs are a random UUID (32 hex digits) plus the lowercased
/// extension of the uploaded file, e.g. `3f2a...c9.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef(String);

impl MediaRef {
    /// Generate a fresh ref for an upload named `original_name`
    pub fn generate(original_name: &str) -> Self {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                e.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

        Self(format!("{}.{}", Uuid::new_v4().simple(), extension))
    }

    /// Accept a client-supplied ref if it is a plain file name token
    ///
    /// Anything that could escape the media directory is refused.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_REF_LEN
            && !raw.starts_with('.')
            && !raw.contains("..")
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

        valid.then(|| Self(raw.to_string()))
    }

    /// The ref as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain text
    Text {
        /// Trimmed, non-empty body
        body: String,
    },
    /// Reference to an uploaded photo
    Photo {
        /// Ref returned by the media store
        media_ref: MediaRef,
        /// Optional caption shown with the photo
        caption: Option<String>,
    },
}

/// A single entry in the chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name, free-form
    pub author: String,
    /// Text or photo payload
    pub kind: MessageKind,
}

impl Message {
    /// Build a text message, rejecting bodies that are empty after trimming
    pub fn text(author: &str, body: &str) -> Result<Self, StoreError> {
        let body = single_line(body.trim());
        if body.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "Message body cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            author: single_line(author),
            kind: MessageKind::Text { body },
        })
    }

    /// Build a photo message; a blank caption is dropped
    pub fn photo(author: &str, media_ref: MediaRef, caption: Option<&str>) -> Self {
        let caption = caption
            .map(|c| single_line(c.trim()))
            .filter(|c| !c.trim().is_empty());

        Self {
            author: single_line(author),
            kind: MessageKind::Photo { media_ref, caption },
        }
    }

    /// Encode as a log line, including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.author, AUTHOR_SEPARATOR)?;
        match &self.kind {
            MessageKind::Text { body } => f.write_str(body),
            MessageKind::Photo {
                media_ref,
                caption: Some(caption),
            } => write!(f, "{}{}|{}", PHOTO_MARKER, media_ref, caption),
            MessageKind::Photo {
                media_ref,
                caption: None,
            } => write!(f, "{}{}", PHOTO_MARKER, media_ref),
        }
    }
}

/// Fold line breaks into spaces so one message always stays one log line
fn single_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_line_format() {
        let message = Message::text("Alice", "  hello there  ").unwrap();
        assert_eq!(message.to_line(), "Alice : hello there\n");
    }

    #[test]
    fn test_text_rejects_blank_body() {
        for body in ["", "   ", "\n\t "] {
            match Message::text("Alice", body) {
                Err(StoreError::InvalidInput(_)) => {}
                other => panic!("Expected InvalidInput for {:?}, got: {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_embedded_newlines_stay_on_one_line() {
        let message = Message::text("Bob\n", "first\r\nsecond\nthird").unwrap();
        let line = message.to_line();
        assert_eq!(line, "Bob  : first second third\n");
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_photo_line_with_and_without_caption() {
        let media_ref = MediaRef::parse("abc123.jpg").unwrap();

        let with_caption = Message::photo("Alice", media_ref.clone(), Some("sunset"));
        assert_eq!(with_caption.to_string(), "Alice : [photo]abc123.jpg|sunset");

        let blank_caption = Message::photo("Alice", media_ref.clone(), Some("   "));
        assert_eq!(blank_caption.to_string(), "Alice : [photo]abc123.jpg");

        let no_caption = Message::photo("Alice", media_ref, None);
        assert_eq!(no_caption.to_string(), "Alice : [photo]abc123.jpg");
    }

    #[test]
    fn test_generated_ref_keeps_extension() {
        let media_ref = MediaRef::generate("beach.JPG");
        let (stem, extension) = media_ref.as_str().split_once('.').unwrap();
        assert_eq!(extension, "jpg");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ref_without_extension() {
        let media_ref = MediaRef::generate("README");
        assert!(media_ref.as_str().ends_with(".bin"));
    }

    #[test]
    fn test_generated_refs_are_unique() {
        assert_ne!(MediaRef::generate("x.png"), MediaRef::generate("x.png"));
    }

    #[test]
    fn test_parse_rejects_path_like_refs() {
        for raw in ["", "../chat.txt", ".hidden", "a/b.png", "a\\b.png", "x..png"] {
            assert!(MediaRef::parse(raw).is_none(), "{:?} should be rejected", raw);
        }
        assert!(MediaRef::parse("0f3c_a-1.png").is_some());
    }
}
