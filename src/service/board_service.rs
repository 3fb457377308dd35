//! Board service: submit, list, like, and report boards.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    Board, BoardEvent, BoardId, BoardSummary, EventBus, ImageId, NewBoard, ThreadId,
};
use crate::error::BoardError;
use crate::persistence::{BoardStore, Database, ThreadStore, UnitOfWork};
use crate::storage::{FileStore, UploadedFile};

/// Input for [`BoardService::submit_board`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSubmitRequest {
    /// Author name.
    pub user_name: String,
    /// Thread to post into.
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    Likes,
    Reports,
}

/// Orchestration layer for all board operations.
///
/// Stateless coordinator over a [`Database`], a [`FileStore`], and the
/// [`EventBus`]. Every mutation follows the pattern: begin unit of work →
/// validate → mutate → commit → emit event. Events are only emitted after
/// a successful commit.
#[derive(Debug, Clone)]
pub struct BoardService {
    database: Arc<dyn Database>,
    file_store: Arc<dyn FileStore>,
    event_bus: EventBus,
}

impl BoardService {
    /// Creates a new `BoardService`.
    #[must_use]
    pub fn new(
        database: Arc<dyn Database>,
        file_store: Arc<dyn FileStore>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            database,
            file_store,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Posts a new board into an existing thread, storing `file` as its
    /// image when present.
    ///
    /// If persisting fails after the image was stored, the image is
    /// removed again and no event is published.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ThreadNotFound`] if the thread does not exist,
    /// or a storage/persistence error from the collaborators.
    pub async fn submit_board(
        &self,
        request: BoardSubmitRequest,
        file: Option<UploadedFile>,
    ) -> Result<Board, BoardError> {
        let mut uow = self.database.begin().await?;
        let thread = uow
            .find_thread(request.thread_id)
            .await?
            .ok_or(BoardError::ThreadNotFound(request.thread_id))?;

        let image = match &file {
            Some(file) => self.file_store.store(file).await?,
            None => None,
        }
        .map(|image_id| PendingImage::new(Arc::clone(&self.file_store), image_id));

        let new_board = NewBoard {
            user_name: request.user_name,
            thread_id: thread.id,
            image_id: image.as_ref().map(|image| image.id().clone()),
        };
        let board = match save_and_commit(uow, new_board).await {
            Ok(board) => board,
            Err(err) => {
                if let Some(image) = image {
                    image.discard().await;
                }
                return Err(err);
            }
        };
        if let Some(image) = image {
            image.keep();
        }

        tracing::info!(
            board_id = %board.id,
            thread_id = %thread.id,
            has_image = board.image_id.is_some(),
            "board submitted"
        );

        let _ = self.event_bus.publish(BoardEvent::BoardSubmitted {
            thread,
            board: board.clone(),
            timestamp: Utc::now(),
        });

        Ok(board)
    }

    /// Returns a point-in-time snapshot of all boards in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Persistence`] on database failure.
    pub async fn list_board(&self) -> Result<Vec<BoardSummary>, BoardError> {
        let mut uow = self.database.begin().await?;
        let boards = uow.find_all_boards().await?;
        uow.commit().await?;

        tracing::debug!(count = boards.len(), "boards listed");
        Ok(boards.iter().map(|board| self.summarize(board)).collect())
    }

    /// Adds one like to a board and publishes
    /// [`BoardEvent::BoardLiked`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BoardNotFound`] if the board does not exist.
    pub async fn board_like(&self, board_id: BoardId) -> Result<Board, BoardError> {
        let board = self.increment(board_id, Counter::Likes).await?;
        tracing::info!(%board_id, likes = board.likes, "board liked");

        let _ = self.event_bus.publish(BoardEvent::BoardLiked {
            board: board.clone(),
            timestamp: Utc::now(),
        });
        Ok(board)
    }

    /// Adds one report to a board. No event is published.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BoardNotFound`] if the board does not exist.
    pub async fn board_report(&self, board_id: BoardId) -> Result<Board, BoardError> {
        let board = self.increment(board_id, Counter::Reports).await?;
        tracing::info!(%board_id, reports = board.reports, "board reported");
        Ok(board)
    }

    /// Builds the list view of `board`, resolving its image path.
    #[must_use]
    pub fn summarize(&self, board: &Board) -> BoardSummary {
        let image_path = self.file_store.resolve_path(board.image_id.as_ref());
        BoardSummary::new(board, image_path)
    }

    async fn increment(&self, board_id: BoardId, counter: Counter) -> Result<Board, BoardError> {
        let mut uow = self.database.begin().await?;
        let mut board = uow
            .find_board(board_id)
            .await?
            .ok_or(BoardError::BoardNotFound(board_id))?;

        match counter {
            Counter::Likes => board.add_like()?,
            Counter::Reports => board.add_report()?,
        }

        uow.update_board(&board).await?;
        uow.commit().await?;
        Ok(board)
    }
}

/// A stored image whose board is not committed yet.
///
/// Dropping it while armed removes the file on a background task, so a
/// caller that abandons `submit_board` mid-flight leaves no orphan.
#[derive(Debug)]
struct PendingImage {
    file_store: Arc<dyn FileStore>,
    image_id: ImageId,
    armed: bool,
}

impl PendingImage {
    fn new(file_store: Arc<dyn FileStore>, image_id: ImageId) -> Self {
        Self {
            file_store,
            image_id,
            armed: true,
        }
    }

    fn id(&self) -> &ImageId {
        &self.image_id
    }

    /// The board now references the image.
    fn keep(mut self) {
        self.armed = false;
    }

    /// Removes the image in place. If this future is dropped early the
    /// guard is still armed and `Drop` retries; removal is idempotent.
    async fn discard(mut self) {
        discard_image(self.file_store.as_ref(), &self.image_id).await;
        self.armed = false;
    }
}

impl Drop for PendingImage {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let file_store = Arc::clone(&self.file_store);
        let image_id = self.image_id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    discard_image(file_store.as_ref(), &image_id).await;
                });
            }
            Err(_) => {
                tracing::warn!(%image_id, "no runtime left to remove orphaned image");
            }
        }
    }
}

async fn discard_image(file_store: &dyn FileStore, image_id: &ImageId) {
    match file_store.remove(image_id).await {
        Ok(_) => tracing::debug!(%image_id, "orphaned image removed"),
        Err(e) => tracing::warn!(%image_id, error = %e, "failed to remove orphaned image"),
    }
}

async fn save_and_commit(
    mut uow: Box<dyn UnitOfWork>,
    new_board: NewBoard,
) -> Result<Board, BoardError> {
    let board = uow.save_board(new_board).await?;
    uow.commit().await?;
    Ok(board)
}
