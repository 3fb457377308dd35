//! Board and thread DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BoardId, BoardSummary, Thread, ThreadId};

/// A board as returned by every board endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardResponse {
    /// Board identifier.
    pub id: BoardId,
    /// Author name.
    pub user_name: String,
    /// Owning thread.
    pub thread_id: ThreadId,
    /// Public path of the attached image, if any.
    pub image_path: Option<String>,
    /// Number of likes.
    pub likes: u64,
    /// Number of reports.
    pub reports: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<BoardSummary> for BoardResponse {
    fn from(s: BoardSummary) -> Self {
        Self {
            id: s.id,
            user_name: s.user_name,
            thread_id: s.thread_id,
            image_path: s.image_path,
            likes: s.likes,
            reports: s.reports,
            created_at: s.created_at,
        }
    }
}

/// Multipart form accepted by `POST /boards`. Documentation only; the
/// handler reads the fields one by one.
///
/// `userName` and `threadId` are accepted as aliases.
#[derive(Debug, ToSchema)]
pub struct BoardSubmitForm {
    /// Author name, 1 to 50 characters after trimming.
    pub user_name: String,
    /// Id of an existing thread.
    pub thread_id: i64,
    /// Optional image attachment.
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}

/// Response body for `POST /threads` (201 Created).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateThreadResponse {
    /// New thread identifier.
    pub thread_id: ThreadId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Thread> for CreateThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            thread_id: thread.id,
            created_at: thread.created_at,
        }
    }
}
