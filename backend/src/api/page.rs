//! Chat page pass-through

use crate::state::AppState;
use axum::{extract::State, response::Html};

/// GET / - The chat page, fetched from its source on every request
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.fetch(&state.http).await)
}
