//! WebSocket layer: connection handling, message routing, thread filters.
//!
//! The WebSocket endpoint at `/ws` streams board events to clients, filtered
//! by the threads each connection subscribed to.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod thread_filter;
