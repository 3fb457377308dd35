//! Persistence layer: transactional access to threads and boards.
//!
//! Every service operation runs inside one [`UnitOfWork`] obtained from a
//! [`Database`]. A unit of work exposes the [`ThreadStore`] and
//! [`BoardStore`] operations, is made durable with
//! [`UnitOfWork::commit`], and rolls back when dropped uncommitted.
//!
//! Two backends are provided: [`memory::MemoryDatabase`] (serializable,
//! process-local) and [`postgres::PostgresDatabase`] (`sqlx::PgPool`).

pub mod event_log;
pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Board, BoardId, NewBoard, Thread, ThreadId};
use crate::error::BoardError;

/// Lookup (and seeding) of parent threads.
#[async_trait]
pub trait ThreadStore: Send {
    /// Returns the thread with `id`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    async fn find_thread(&mut self, id: ThreadId) -> Result<Option<Thread>, BoardError>;

    /// Creates a new, empty thread.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    async fn insert_thread(&mut self) -> Result<Thread, BoardError>;
}

/// Create/read/update of boards.
#[async_trait]
pub trait BoardStore: Send {
    /// Returns the board with `id`, locking it until the unit of work ends.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    async fn find_board(&mut self, id: BoardId) -> Result<Option<Board>, BoardError>;

    /// Persists a new board, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ThreadNotFound`] if the thread does not exist,
    /// or [`BoardError::Persistence`] on database failure.
    async fn save_board(&mut self, new: NewBoard) -> Result<Board, BoardError>;

    /// Writes back the counters of an existing board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BoardNotFound`] if the board does not exist,
    /// or [`BoardError::Persistence`] on database failure.
    async fn update_board(&mut self, board: &Board) -> Result<(), BoardError>;

    /// Returns every board ordered by ascending id.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    async fn find_all_boards(&mut self) -> Result<Vec<Board>, BoardError>;
}

/// A single all-or-nothing transaction over threads and boards.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] discards
/// every change made through it.
#[async_trait]
pub trait UnitOfWork: ThreadStore + BoardStore {
    /// Makes all changes durable and visible.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] if the commit fails; nothing is
    /// applied in that case.
    async fn commit(self: Box<Self>) -> Result<(), BoardError>;
}

/// Entry point to a store backend.
#[async_trait]
pub trait Database: Send + Sync + fmt::Debug {
    /// Opens a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] if no transaction can be started.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, BoardError>;
}
