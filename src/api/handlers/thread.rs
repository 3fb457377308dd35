//! Thread handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::CreateThreadResponse;
use crate::app_state::AppState;
use crate::error::{BoardError, ErrorResponse};

/// `POST /threads`: Open a new thread.
///
/// # Errors
///
/// Returns [`BoardError::Persistence`] on database failure.
#[utoipa::path(
    post,
    path = "/api/v1/threads",
    tag = "Threads",
    summary = "Create a thread",
    description = "Opens an empty thread that boards can be submitted into.",
    responses(
        (status = 201, description = "Thread created", body = CreateThreadResponse),
        (status = 500, description = "Database failure", body = ErrorResponse),
    )
)]
pub async fn create_thread(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BoardError> {
    let thread = state.thread_service.create_thread().await?;
    Ok((StatusCode::CREATED, Json(CreateThreadResponse::from(thread))))
}

/// Thread routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/threads", post(create_thread))
}
