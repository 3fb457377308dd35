//! Domain events reflecting board state changes.
//!
//! Committed creations and likes emit a [`BoardEvent`] through the
//! [`super::EventBus`]. Events fan out to registered listeners, WebSocket
//! subscribers, and optionally the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Board, BoardId, Thread, ThreadId};

/// Domain event emitted after a committed state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A new board was posted to a thread.
    BoardSubmitted {
        /// Thread the board was posted to.
        thread: Thread,
        /// The newly created board.
        board: Board,
        /// Publication timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A board received a like.
    BoardLiked {
        /// The board with its updated like counter.
        board: Board,
        /// Publication timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl BoardEvent {
    /// Returns the board this event is about.
    #[must_use]
    pub fn board(&self) -> &Board {
        match self {
            Self::BoardSubmitted { board, .. } | Self::BoardLiked { board, .. } => board,
        }
    }

    /// Returns the board ID associated with this event.
    #[must_use]
    pub fn board_id(&self) -> BoardId {
        self.board().id
    }

    /// Returns the thread the affected board belongs to.
    #[must_use]
    pub fn thread_id(&self) -> ThreadId {
        self.board().thread_id
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::BoardSubmitted { .. } => "board_submitted",
            Self::BoardLiked { .. } => "board_liked",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewBoard;

    fn make_board(id: i64, thread: i64) -> Board {
        Board::create(
            BoardId::from(id),
            NewBoard {
                user_name: "bob".to_string(),
                thread_id: ThreadId::from(thread),
                image_id: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn accessors_point_at_the_board() {
        let event = BoardEvent::BoardLiked {
            board: make_board(3, 8),
            timestamp: Utc::now(),
        };
        assert_eq!(event.board_id(), BoardId::from(3));
        assert_eq!(event.thread_id(), ThreadId::from(8));
        assert_eq!(event.event_type_str(), "board_liked");
    }

    #[test]
    fn submitted_serializes_with_tag() {
        let event = BoardEvent::BoardSubmitted {
            thread: Thread {
                id: ThreadId::from(8),
                created_at: Utc::now(),
            },
            board: make_board(4, 8),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"board_submitted\""));
        assert!(json.contains("\"user_name\":\"bob\""));
    }
}
