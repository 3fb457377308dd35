//! Listener components reacting to [`BoardEvent`]s.
//!
//! A listener is attached to the bus with
//! [`EventBus::spawn_listener`](super::EventBus::spawn_listener) and runs
//! on its own task, so a slow listener never delays the request that
//! published the event.

use async_trait::async_trait;

use super::BoardEvent;

/// Handler for domain events delivered by the [`super::EventBus`].
#[async_trait]
pub trait BoardEventListener: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Reacts to a single event. Failures are the listener's own concern
    /// and must not panic.
    async fn handle(&self, event: &BoardEvent);
}

/// Writes one structured log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityLogListener;

#[async_trait]
impl BoardEventListener for ActivityLogListener {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    async fn handle(&self, event: &BoardEvent) {
        let board = event.board();
        tracing::info!(
            event_type = event.event_type_str(),
            board_id = %board.id,
            thread_id = %board.thread_id,
            likes = board.likes,
            "board activity"
        );
    }
}
