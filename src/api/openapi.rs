//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{board, system, thread};

/// Generated OpenAPI description, served by Swagger UI when the
/// `swagger-ui` feature is on.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "drawwang-board",
        description = "Boards (posts) within threads: submit, list, like, report."
    ),
    paths(
        board::submit_board,
        board::list_boards,
        board::like_board,
        board::report_board,
        thread::create_thread,
        system::health_handler,
    ),
    tags(
        (name = "Boards", description = "Board submission and reactions"),
        (name = "Threads", description = "Thread seeding"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;
