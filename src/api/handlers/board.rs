//! Board handlers: submit, list, like, report.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BoardResponse, BoardSubmitForm};
use crate::app_state::AppState;
use crate::domain::{BoardId, ThreadId};
use crate::error::{BoardError, ErrorResponse};
use crate::service::BoardSubmitRequest;
use crate::storage::UploadedFile;

/// Longest accepted user name, in characters.
const MAX_USER_NAME_CHARS: usize = 50;

/// `POST /boards`: Submit a board into a thread.
///
/// # Errors
///
/// Returns [`BoardError::InvalidRequest`] on a malformed form and
/// [`BoardError::ThreadNotFound`] if the thread does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/boards",
    tag = "Boards",
    summary = "Submit a board",
    description = "Creates a board in an existing thread, optionally with an image attachment. Publishes a board_submitted event.",
    request_body(content = BoardSubmitForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Board created", body = BoardResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Thread not found", body = ErrorResponse),
    )
)]
pub async fn submit_board(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, BoardError> {
    let (request, file) = read_submit_form(multipart, state.max_upload_bytes).await?;
    let board = state.board_service.submit_board(request, file).await?;
    let response = BoardResponse::from(state.board_service.summarize(&board));
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /boards`: List every board in creation order.
///
/// # Errors
///
/// Returns [`BoardError`] on persistence failures.
#[utoipa::path(
    get,
    path = "/api/v1/boards",
    tag = "Boards",
    summary = "List boards",
    description = "Returns all boards ordered by id, with image paths resolved.",
    responses(
        (status = 200, description = "Board list", body = Vec<BoardResponse>),
    )
)]
pub async fn list_boards(State(state): State<AppState>) -> Result<impl IntoResponse, BoardError> {
    let boards: Vec<BoardResponse> = state
        .board_service
        .list_board()
        .await?
        .into_iter()
        .map(BoardResponse::from)
        .collect();
    Ok(Json(boards))
}

/// `POST /boards/{id}/like`: Add one like.
///
/// # Errors
///
/// Returns [`BoardError::BoardNotFound`] if the board does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/boards/{id}/like",
    tag = "Boards",
    summary = "Like a board",
    description = "Increments the like counter by one and publishes a board_liked event.",
    params(
        ("id" = i64, Path, description = "Board id"),
    ),
    responses(
        (status = 200, description = "Updated board", body = BoardResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn like_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, BoardError> {
    let board = state.board_service.board_like(BoardId::from(id)).await?;
    Ok(Json(BoardResponse::from(state.board_service.summarize(&board))))
}

/// `POST /boards/{id}/report`: Add one report.
///
/// # Errors
///
/// Returns [`BoardError::BoardNotFound`] if the board does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/boards/{id}/report",
    tag = "Boards",
    summary = "Report a board",
    description = "Increments the report counter by one. No event is published.",
    params(
        ("id" = i64, Path, description = "Board id"),
    ),
    responses(
        (status = 200, description = "Updated board", body = BoardResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn report_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, BoardError> {
    let board = state.board_service.board_report(BoardId::from(id)).await?;
    Ok(Json(BoardResponse::from(state.board_service.summarize(&board))))
}

/// Board routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boards", post(submit_board).get(list_boards))
        .route("/boards/{id}/like", post(like_board))
        .route("/boards/{id}/report", post(report_board))
}

// ── Form Parsing Helpers ────────────────────────────────────────────────

/// Reads the submit form. Unknown fields are ignored.
async fn read_submit_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<(BoardSubmitRequest, Option<UploadedFile>), BoardError> {
    let mut user_name = None;
    let mut thread_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_name" | "userName" => {
                user_name = Some(field.text().await.map_err(multipart_error)?);
            }
            "thread_id" | "threadId" => {
                thread_id = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
                if bytes.len() > max_upload_bytes {
                    return Err(BoardError::InvalidRequest(format!(
                        "file exceeds {max_upload_bytes} bytes"
                    )));
                }
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let user_name = validate_user_name(user_name.as_deref())?;
    let thread_id = validate_thread_id(thread_id.as_deref())?;
    Ok((
        BoardSubmitRequest {
            user_name,
            thread_id,
        },
        file,
    ))
}

fn validate_user_name(raw: Option<&str>) -> Result<String, BoardError> {
    let name = raw
        .map(str::trim)
        .ok_or_else(|| BoardError::InvalidRequest("user_name is required".to_string()))?;
    let len = name.chars().count();
    if len == 0 || len > MAX_USER_NAME_CHARS {
        return Err(BoardError::InvalidRequest(format!(
            "user_name must be 1 to {MAX_USER_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_thread_id(raw: Option<&str>) -> Result<ThreadId, BoardError> {
    let raw = raw.ok_or_else(|| BoardError::InvalidRequest("thread_id is required".to_string()))?;
    match raw.parse::<ThreadId>() {
        Ok(id) if id.get() > 0 => Ok(id),
        _ => Err(BoardError::InvalidRequest(format!(
            "thread_id must be a positive integer, got {raw:?}"
        ))),
    }
}

fn multipart_error(e: MultipartError) -> BoardError {
    BoardError::InvalidRequest(e.body_text())
}
