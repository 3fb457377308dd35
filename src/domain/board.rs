//! Board (post) entity, its constructor parameters, and list summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{BoardId, ImageId, ThreadId};
use crate::error::BoardError;

/// A single user-submitted post within a thread.
///
/// `likes` and `reports` only ever grow; `image_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Unique board identifier (assigned by the store).
    pub id: BoardId,

    /// Free-text author name supplied by the caller.
    pub user_name: String,

    /// Owning thread. The thread existed when the board was created.
    pub thread_id: ThreadId,

    /// Attached image, if a file was uploaded.
    pub image_id: Option<ImageId>,

    /// Number of likes received.
    pub likes: u64,

    /// Number of reports received.
    pub reports: u64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Builds a fresh board from `new` with zeroed counters.
    #[must_use]
    pub fn create(id: BoardId, new: NewBoard, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_name: new.user_name,
            thread_id: new.thread_id,
            image_id: new.image_id,
            likes: 0,
            reports: 0,
            created_at,
        }
    }

    /// Records one like.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Internal`] if the counter is already at its
    /// maximum; the board is left unchanged.
    pub fn add_like(&mut self) -> Result<(), BoardError> {
        self.likes = bump(self.likes, "likes", self.id)?;
        Ok(())
    }

    /// Records one report.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Internal`] if the counter is already at its
    /// maximum; the board is left unchanged.
    pub fn add_report(&mut self) -> Result<(), BoardError> {
        self.reports = bump(self.reports, "reports", self.id)?;
        Ok(())
    }
}

fn bump(value: u64, counter: &str, id: BoardId) -> Result<u64, BoardError> {
    value
        .checked_add(1)
        .ok_or_else(|| BoardError::Internal(format!("{counter} counter of board {id} overflowed")))
}

/// Parameters for a board that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoard {
    /// Author name.
    pub user_name: String,
    /// Owning thread.
    pub thread_id: ThreadId,
    /// Stored image handle, if any.
    pub image_id: Option<ImageId>,
}

/// Lightweight view of a board for list endpoints, with the image handle
/// resolved to a displayable path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    /// Board identifier.
    pub id: BoardId,
    /// Author name.
    pub user_name: String,
    /// Owning thread.
    pub thread_id: ThreadId,
    /// Public path of the attached image.
    pub image_path: Option<String>,
    /// Like counter.
    pub likes: u64,
    /// Report counter.
    pub reports: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl BoardSummary {
    /// Builds a summary from `board` and an already resolved image path.
    #[must_use]
    pub fn new(board: &Board, image_path: Option<String>) -> Self {
        Self {
            id: board.id,
            user_name: board.user_name.clone(),
            thread_id: board.thread_id,
            image_path,
            likes: board.likes,
            reports: board.reports,
            created_at: board.created_at,
        }
    }
}
