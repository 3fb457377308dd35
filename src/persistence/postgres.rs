//! PostgreSQL implementation of the persistence layer.
//!
//! Each unit of work is a `sqlx` transaction. Boards read for mutation
//! are locked with `SELECT … FOR UPDATE`, so concurrent likes and reports
//! on the same row are serialized by the database.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{
    BOARD_COLUMNS, BoardRow, ThreadRow, board_from_row, counter_to_column, thread_from_row,
};
use super::{BoardStore, Database, ThreadStore, UnitOfWork};
use crate::domain::{Board, BoardId, NewBoard, Thread, ThreadId};
use crate::error::BoardError;

/// Foreign key constraint guarding `boards.thread_id`.
const BOARD_THREAD_FK: &str = "boards_thread_id_fkey";

/// PostgreSQL-backed [`Database`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Creates a new database handle over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, BoardError> {
        let tx = self.pool.begin().await.map_err(persistence_error)?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ThreadStore for PostgresUnitOfWork {
    async fn find_thread(&mut self, id: ThreadId) -> Result<Option<Thread>, BoardError> {
        // FOR SHARE keeps the thread alive until this transaction ends.
        let row = sqlx::query_as::<_, ThreadRow>(
            "SELECT id, created_at FROM threads WHERE id = $1 FOR SHARE",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(persistence_error)?;

        Ok(row.map(thread_from_row))
    }

    async fn insert_thread(&mut self) -> Result<Thread, BoardError> {
        let row = sqlx::query_as::<_, ThreadRow>(
            "INSERT INTO threads DEFAULT VALUES RETURNING id, created_at",
        )
        .fetch_one(&mut *self.tx)
        .await
        .map_err(persistence_error)?;

        Ok(thread_from_row(row))
    }
}

#[async_trait]
impl BoardStore for PostgresUnitOfWork {
    async fn find_board(&mut self, id: BoardId) -> Result<Option<Board>, BoardError> {
        let row = sqlx::query_as::<_, BoardRow>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(persistence_error)?;

        row.map(board_from_row).transpose()
    }

    async fn save_board(&mut self, new: NewBoard) -> Result<Board, BoardError> {
        let thread_id = new.thread_id;
        let row = sqlx::query_as::<_, BoardRow>(&format!(
            "INSERT INTO boards (user_name, thread_id, image_id, likes, reports) \
             VALUES ($1, $2, $3, 0, 0) RETURNING {BOARD_COLUMNS}"
        ))
        .bind(new.user_name)
        .bind(thread_id.get())
        .bind(new.image_id.map(|id| id.to_string()))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            let orphaned = matches!(
                &e,
                sqlx::Error::Database(db) if db.constraint() == Some(BOARD_THREAD_FK)
            );
            if orphaned {
                BoardError::ThreadNotFound(thread_id)
            } else {
                persistence_error(e)
            }
        })?;

        board_from_row(row)
    }

    async fn update_board(&mut self, board: &Board) -> Result<(), BoardError> {
        let result = sqlx::query("UPDATE boards SET likes = $2, reports = $3 WHERE id = $1")
            .bind(board.id.get())
            .bind(counter_to_column(board.likes)?)
            .bind(counter_to_column(board.reports)?)
            .execute(&mut *self.tx)
            .await
            .map_err(persistence_error)?;

        if result.rows_affected() == 0 {
            return Err(BoardError::BoardNotFound(board.id));
        }
        Ok(())
    }

    async fn find_all_boards(&mut self) -> Result<Vec<Board>, BoardError> {
        let rows = sqlx::query_as::<_, BoardRow>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards ORDER BY id ASC"
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(persistence_error)?;

        rows.into_iter().map(board_from_row).collect()
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), BoardError> {
        self.tx.commit().await.map_err(persistence_error)
    }
}

fn persistence_error(e: sqlx::Error) -> BoardError {
    BoardError::Persistence(e.to_string())
}
