//! Message store
//!
//! Append-only chat log plus a side-store for uploaded photos.
//! The log is a flat UTF-8 file with one message per line; media live as
//! individual files named by a generated ref.

pub mod error;
pub mod log;
pub mod media;
pub mod message;

pub use error::StoreError;
pub use log::MessageStore;
pub use media::MediaStore;
pub use message::{MediaRef, Message, MessageKind, DEFAULT_AUTHOR};
