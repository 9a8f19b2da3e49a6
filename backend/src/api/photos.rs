//! Photo endpoints
//!
//! `POST /upload_photo` stores an uploaded image and appends a photo line;
//! `GET /photos/:media_ref` serves the stored bytes.

use crate::api::types::{author_or_default, OkResponse};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

/// Name used when the uploaded part carries no file name
const UNNAMED_UPLOAD: &str = "upload";

/// Reported whenever no usable `photo` part arrived
const NO_FILE_UPLOADED: &str = "No file uploaded";

/// An uploaded file held in memory until the form is fully read
struct UploadedFile {
    name: String,
    data: Vec<u8>,
}

/// POST /upload_photo - Store a photo and announce it in the log
///
/// Accepts multipart form data with:
/// - photo: the image file (required, non-empty)
/// - caption: optional text shown with the photo
/// - username: optional display name, defaults to `Anon`
///
/// A request that is not `multipart/form-data` carries no photo and gets the
/// same 400 as a form without one. Bodies over the size limit get 413.
///
/// The media is written before the log line, so a line never references
/// bytes that do not exist.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Upload is not multipart form data: {}", rejection.body_text());
        AppError::InvalidInput(NO_FILE_UPLOADED.to_string())
    })?;

    let mut photo: Option<UploadedFile> = None;
    let mut caption: Option<String> = None;
    let mut username: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "photo" => {
                let name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| UNNAMED_UPLOAD.to_string());
                let data = field.bytes().await.map_err(upload_error)?;
                if !data.is_empty() {
                    photo = Some(UploadedFile {
                        name,
                        data: data.to_vec(),
                    });
                }
            }
            "caption" | "username" => {
                let text = field.text().await.map_err(upload_error)?;
                if field_name == "caption" {
                    caption = Some(text);
                } else {
                    username = Some(text);
                }
            }
            _ => {
                warn!("Unknown multipart field: {}", field_name);
            }
        }
    }

    let photo = photo.ok_or_else(|| AppError::InvalidInput(NO_FILE_UPLOADED.to_string()))?;
    let author = author_or_default(username.as_deref());

    let media_ref = state.media.store_media(&photo.data, &photo.name).await?;
    state
        .messages
        .append_photo(author, &media_ref, caption.as_deref())
        .await?;

    info!(
        author = %author,
        media_ref = %media_ref,
        bytes = photo.data.len(),
        "Photo posted"
    );

    Ok(Json(OkResponse::with_filename(media_ref.as_str())))
}

/// Keep the size-limit status; anything else is a malformed form
fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the body limit: {}", e);
        AppError::PayloadTooLarge(e.body_text())
    } else {
        error!("Failed to read multipart upload: {}", e);
        AppError::InvalidInput(format!("Malformed upload: {}", e))
    }
}

/// GET /photos/:media_ref - Raw bytes of a stored photo
///
/// The content type is guessed from the ref's extension.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(media_ref): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.media.read_media(&media_ref).await?;
    let mime = mime_guess::from_path(&media_ref)
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
