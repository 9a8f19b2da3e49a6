//! API module
//!
//! Contains HTTP request handlers for the chat endpoints and the router
//! that wires them to their paths.

pub mod health;
pub mod messages;
pub mod page;
pub mod photos;
pub mod types;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Build the chat router
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/` | chat page |
/// | POST | `/post` | append text |
/// | GET | `/messages` | transcript |
/// | POST | `/upload_photo` | store photo + append photo line |
/// | GET | `/photos/:media_ref` | photo bytes |
/// | GET | `/api/health` | health |
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/post", post(messages::post_message))
        .route("/messages", get(messages::get_messages))
        .route("/upload_photo", post(photos::upload_photo))
        .route("/photos/:media_ref", get(photos::get_photo))
        .route("/api/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}
