//! Service layer: business logic orchestration.
//!
//! [`BoardService`] coordinates the persistence layer and file storage and
//! emits events through the [`super::domain::EventBus`].
//! [`ThreadService`] seeds the threads boards are posted into.

pub mod board_service;
pub mod thread_service;

pub use board_service::{BoardService, BoardSubmitRequest};
pub use thread_service::ThreadService;
