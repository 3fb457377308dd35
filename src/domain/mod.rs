//! Domain layer: entities, identifiers, and the event system.
//!
//! Boards and threads are plain data; state changes are announced as
//! [`BoardEvent`]s on the [`EventBus`] and handled by
//! [`BoardEventListener`]s.

pub mod board;
pub mod board_event;
pub mod event_bus;
pub mod ids;
pub mod listener;
pub mod thread;

pub use board::{Board, BoardSummary, NewBoard};
pub use board_event::BoardEvent;
pub use event_bus::EventBus;
pub use ids::{BoardId, ImageId, ThreadId};
pub use listener::{ActivityLogListener, BoardEventListener};
pub use thread::Thread;
