//! Text message endpoints
//!
//! `POST /post` appends a text line, `GET /messages` returns the whole log.

use crate::api::types::{author_or_default, OkResponse, PostMessageRequest};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::StoreError;
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

/// POST /post - Append a text message
///
/// The body is parsed as JSON regardless of content type. Malformed JSON, a
/// missing `msg`, or a blank `msg` are acknowledged without writing anything.
pub async fn post_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OkResponse>, AppError> {
    let request: PostMessageRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Ignoring malformed message body: {}", e);
        PostMessageRequest::default()
    });

    let author = author_or_default(request.username.as_deref());
    let msg = request.msg.unwrap_or_default();

    match state.messages.append_text(author, &msg).await {
        Ok(()) => {}
        Err(StoreError::InvalidInput(_)) => debug!(author = %author, "Ignoring empty message"),
        Err(e) => return Err(e.into()),
    }

    Ok(Json(OkResponse::ok()))
}

/// GET /messages - The full transcript as plain text
///
/// Never fails: an unreadable log is reported as empty.
pub async fn get_messages(State(state): State<AppState>) -> Response {
    let transcript = state.messages.read_transcript().await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to read transcript");
        Vec::new()
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        transcript,
    )
        .into_response()
}
