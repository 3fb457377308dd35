//! Process-local store used for tests and `PERSISTENCE_ENABLED=false`.
//!
//! [`MemoryDatabase`] keeps all threads and boards behind one
//! [`tokio::sync::Mutex`]. A unit of work holds the lock for its whole
//! lifetime and writes straight into the live state, recording an undo
//! step per change. Dropping it uncommitted replays the undo log in
//! reverse. Transactions are therefore fully serialized: two concurrent
//! likes on the same board always add up.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BoardStore, Database, ThreadStore, UnitOfWork};
use crate::domain::{Board, BoardId, NewBoard, Thread, ThreadId};
use crate::error::BoardError;

#[derive(Debug, Default)]
struct MemoryState {
    threads: BTreeMap<ThreadId, Thread>,
    boards: BTreeMap<BoardId, Board>,
    last_thread_id: i64,
    last_board_id: i64,
}

/// In-memory [`Database`] with serializable transactions.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed boards.
    pub async fn board_count(&self) -> usize {
        self.state.lock().await.boards.len()
    }

    /// Returns the number of committed threads.
    pub async fn thread_count(&self) -> usize {
        self.state.lock().await.threads.len()
    }

    #[cfg(test)]
    async fn set_last_ids(&self, thread: i64, board: i64) {
        let mut state = self.state.lock().await;
        state.last_thread_id = thread;
        state.last_board_id = board;
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, BoardError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            last_ids: (guard.last_thread_id, guard.last_board_id),
            guard,
            undo: Vec::new(),
            committed: false,
        }))
    }
}

/// Inverse of one change made inside a unit of work.
#[derive(Debug)]
enum Undo {
    ForgetThread(ThreadId),
    ForgetBoard(BoardId),
    RestoreCounters { id: BoardId, likes: u64, reports: u64 },
}

/// Transaction over a [`MemoryDatabase`].
#[derive(Debug)]
struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    /// Id sequences as they were at `begin`.
    last_ids: (i64, i64),
    undo: Vec<Undo>,
    committed: bool,
}

fn next_id(last: i64, kind: &str) -> Result<i64, BoardError> {
    last.checked_add(1)
        .ok_or_else(|| BoardError::Internal(format!("{kind} id sequence exhausted")))
}

#[async_trait]
impl ThreadStore for MemoryUnitOfWork {
    async fn find_thread(&mut self, id: ThreadId) -> Result<Option<Thread>, BoardError> {
        Ok(self.guard.threads.get(&id).cloned())
    }

    async fn insert_thread(&mut self) -> Result<Thread, BoardError> {
        let raw = next_id(self.guard.last_thread_id, "thread")?;
        let thread = Thread {
            id: ThreadId::from(raw),
            created_at: Utc::now(),
        };
        self.guard.last_thread_id = raw;
        self.guard.threads.insert(thread.id, thread.clone());
        self.undo.push(Undo::ForgetThread(thread.id));
        Ok(thread)
    }
}

#[async_trait]
impl BoardStore for MemoryUnitOfWork {
    async fn find_board(&mut self, id: BoardId) -> Result<Option<Board>, BoardError> {
        Ok(self.guard.boards.get(&id).cloned())
    }

    async fn save_board(&mut self, new: NewBoard) -> Result<Board, BoardError> {
        if !self.guard.threads.contains_key(&new.thread_id) {
            return Err(BoardError::ThreadNotFound(new.thread_id));
        }
        let raw = next_id(self.guard.last_board_id, "board")?;
        let board = Board::create(BoardId::from(raw), new, Utc::now());
        self.guard.last_board_id = raw;
        self.guard.boards.insert(board.id, board.clone());
        self.undo.push(Undo::ForgetBoard(board.id));
        Ok(board)
    }

    async fn update_board(&mut self, board: &Board) -> Result<(), BoardError> {
        let stored = self
            .guard
            .boards
            .get_mut(&board.id)
            .ok_or(BoardError::BoardNotFound(board.id))?;
        let previous = Undo::RestoreCounters {
            id: board.id,
            likes: stored.likes,
            reports: stored.reports,
        };
        stored.likes = board.likes;
        stored.reports = board.reports;
        self.undo.push(previous);
        Ok(())
    }

    async fn find_all_boards(&mut self) -> Result<Vec<Board>, BoardError> {
        Ok(self.guard.boards.values().cloned().collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), BoardError> {
        let mut uow = *self;
        uow.committed = true;
        Ok(())
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let state = &mut *self.guard;
        for step in std::mem::take(&mut self.undo).into_iter().rev() {
            match step {
                Undo::ForgetThread(id) => {
                    state.threads.remove(&id);
                }
                Undo::ForgetBoard(id) => {
                    state.boards.remove(&id);
                }
                Undo::RestoreCounters { id, likes, reports } => {
                    if let Some(board) = state.boards.get_mut(&id) {
                        board.likes = likes;
                        board.reports = reports;
                    }
                }
            }
        }
        (state.last_thread_id, state.last_board_id) = self.last_ids;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn seed_thread(db: &MemoryDatabase) -> Thread {
        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let Ok(thread) = uow.insert_thread().await else {
            panic!("insert_thread failed");
        };
        let Ok(()) = uow.commit().await else {
            panic!("commit failed");
        };
        thread
    }

    fn new_board(thread_id: ThreadId) -> NewBoard {
        NewBoard {
            user_name: "dave".to_string(),
            thread_id,
            image_id: None,
        }
    }

    #[tokio::test]
    async fn committed_board_is_visible() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let Ok(board) = uow.save_board(new_board(thread.id)).await else {
            panic!("save failed");
        };
        let Ok(()) = uow.commit().await else {
            panic!("commit failed");
        };

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let found = uow.find_board(board.id).await.ok().flatten();
        assert_eq!(found, Some(board));
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;

        {
            let Ok(mut uow) = db.begin().await else {
                panic!("begin failed");
            };
            assert!(uow.save_board(new_board(thread.id)).await.is_ok());
        }

        assert_eq!(db.board_count().await, 0);
        assert_eq!(db.thread_count().await, 1);
    }

    #[tokio::test]
    async fn save_rejects_unknown_thread() {
        let db = MemoryDatabase::new();
        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let result = uow.save_board(new_board(ThreadId::from(99))).await;
        assert!(matches!(result, Err(BoardError::ThreadNotFound(_))));
    }

    #[tokio::test]
    async fn ids_follow_creation_order() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        for _ in 0..3 {
            assert!(uow.save_board(new_board(thread.id)).await.is_ok());
        }
        let Ok(all) = uow.find_all_boards().await else {
            panic!("find_all failed");
        };
        let ids: Vec<i64> = all.iter().map(|b| b.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_of_missing_board_fails() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;
        let ghost = Board::create(BoardId::from(5), new_board(thread.id), Utc::now());

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let result = uow.update_board(&ghost).await;
        assert!(matches!(result, Err(BoardError::BoardNotFound(_))));
    }

    #[tokio::test]
    async fn dropped_update_restores_counters() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;
        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let Ok(board) = uow.save_board(new_board(thread.id)).await else {
            panic!("save failed");
        };
        let Ok(()) = uow.commit().await else {
            panic!("commit failed");
        };

        {
            let Ok(mut uow) = db.begin().await else {
                panic!("begin failed");
            };
            let mut liked = board.clone();
            liked.likes = 7;
            liked.reports = 3;
            assert!(uow.update_board(&liked).await.is_ok());
            assert!(uow.update_board(&liked).await.is_ok());
        }

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let found = uow.find_board(board.id).await.ok().flatten();
        assert_eq!(found.map(|b| (b.likes, b.reports)), Some((0, 0)));
    }

    #[tokio::test]
    async fn rolled_back_ids_are_reused() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;

        {
            let Ok(mut uow) = db.begin().await else {
                panic!("begin failed");
            };
            assert!(uow.insert_thread().await.is_ok());
            assert!(uow.save_board(new_board(thread.id)).await.is_ok());
        }

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        let Ok(board) = uow.save_board(new_board(thread.id)).await else {
            panic!("save failed");
        };
        assert_eq!(board.id, BoardId::from(1));
        let Ok(next_thread) = uow.insert_thread().await else {
            panic!("insert_thread failed");
        };
        assert_eq!(next_thread.id, ThreadId::from(2));
    }

    #[tokio::test]
    async fn exhausted_sequence_never_overwrites() {
        let db = MemoryDatabase::new();
        let thread = seed_thread(&db).await;
        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        assert!(uow.save_board(new_board(thread.id)).await.is_ok());
        let Ok(()) = uow.commit().await else {
            panic!("commit failed");
        };
        db.set_last_ids(i64::MAX, i64::MAX).await;

        let Ok(mut uow) = db.begin().await else {
            panic!("begin failed");
        };
        assert!(matches!(
            uow.save_board(new_board(thread.id)).await,
            Err(BoardError::Internal(_))
        ));
        assert!(matches!(uow.insert_thread().await, Err(BoardError::Internal(_))));
        drop(uow);

        assert_eq!(db.board_count().await, 1);
        assert_eq!(db.thread_count().await, 1);
    }
}
