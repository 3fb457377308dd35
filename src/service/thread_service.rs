//! Thread service: seeding parent threads for boards.

use std::sync::Arc;

use crate::domain::Thread;
use crate::error::BoardError;
use crate::persistence::{Database, ThreadStore};

/// Creates threads. Boards only reference threads, so this is the one
/// place new threads come from.
#[derive(Debug, Clone)]
pub struct ThreadService {
    database: Arc<dyn Database>,
}

impl ThreadService {
    /// Creates a new `ThreadService`.
    #[must_use]
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self { database }
    }

    /// Opens a new, empty thread.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    pub async fn create_thread(&self) -> Result<Thread, BoardError> {
        let mut uow = self.database.begin().await?;
        let thread = uow.insert_thread().await?;
        uow.commit().await?;

        tracing::info!(thread_id = %thread.id, "thread created");
        Ok(thread)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryDatabase;

    #[tokio::test]
    async fn threads_get_distinct_ids() {
        let db = MemoryDatabase::new();
        let service = ThreadService::new(Arc::new(db.clone()));

        let Ok(a) = service.create_thread().await else {
            panic!("create failed");
        };
        let Ok(b) = service.create_thread().await else {
            panic!("create failed");
        };
        assert_ne!(a.id, b.id);
        assert_eq!(db.thread_count().await, 2);
    }
}
