//! Database row models for threads and boards.

use chrono::{DateTime, Utc};

use crate::domain::{Board, BoardId, ImageId, Thread, ThreadId};
use crate::error::BoardError;

/// Column tuple selected from the `threads` table: `(id, created_at)`.
pub type ThreadRow = (i64, DateTime<Utc>);

/// Column tuple selected from the `boards` table:
/// `(id, user_name, thread_id, image_id, likes, reports, created_at)`.
pub type BoardRow = (
    i64,
    String,
    i64,
    Option<String>,
    i64,
    i64,
    DateTime<Utc>,
);

/// Column list matching [`BoardRow`].
pub const BOARD_COLUMNS: &str = "id, user_name, thread_id, image_id, likes, reports, created_at";

/// Converts a `threads` row into a [`Thread`].
#[must_use]
pub fn thread_from_row((id, created_at): ThreadRow) -> Thread {
    Thread {
        id: ThreadId::from(id),
        created_at,
    }
}

/// Converts a `boards` row into a [`Board`].
///
/// # Errors
///
/// Returns [`BoardError::Persistence`] if a counter column is negative.
pub fn board_from_row(row: BoardRow) -> Result<Board, BoardError> {
    let (id, user_name, thread_id, image_id, likes, reports, created_at) = row;
    Ok(Board {
        id: BoardId::from(id),
        user_name,
        thread_id: ThreadId::from(thread_id),
        image_id: image_id.map(ImageId::new),
        likes: counter_from_column(likes)?,
        reports: counter_from_column(reports)?,
        created_at,
    })
}

/// Converts a domain counter to its `BIGINT` column value.
///
/// # Errors
///
/// Returns [`BoardError::Persistence`] if the counter exceeds `i64::MAX`.
pub fn counter_to_column(value: u64) -> Result<i64, BoardError> {
    i64::try_from(value)
        .map_err(|_| BoardError::Persistence(format!("counter {value} out of range")))
}

fn counter_from_column(value: i64) -> Result<u64, BoardError> {
    u64::try_from(value)
        .map_err(|_| BoardError::Persistence(format!("negative counter {value} in boards row")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn board_row_converts() {
        let now = Utc::now();
        let row: BoardRow = (3, "erin".to_string(), 1, Some("ab.png".to_string()), 4, 0, now);
        let Ok(board) = board_from_row(row) else {
            panic!("conversion failed");
        };
        assert_eq!(board.id, BoardId::from(3));
        assert_eq!(board.image_id, Some(ImageId::new("ab.png")));
        assert_eq!(board.likes, 4);
        assert_eq!(board.created_at, now);
    }

    #[test]
    fn negative_counter_is_rejected() {
        let row: BoardRow = (3, "erin".to_string(), 1, None, -1, 0, Utc::now());
        assert!(matches!(
            board_from_row(row),
            Err(BoardError::Persistence(_))
        ));
    }

    #[test]
    fn counter_round_trips_through_column() {
        assert_eq!(counter_to_column(12).ok(), Some(12));
        assert!(counter_to_column(u64::MAX).is_err());
    }
}
