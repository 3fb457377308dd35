//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{BoardService, ThreadService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Board operations.
    pub board_service: Arc<BoardService>,
    /// Thread creation.
    pub thread_service: Arc<ThreadService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}
