//! # drawwang-board
//!
//! REST API and WebSocket backend for boards: short posts, optionally with
//! an image, submitted into threads and collecting likes and reports.
//!
//! Every mutation runs inside one unit of work. Events for new boards and
//! likes are published only after the unit of work commits.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── BoardService, ThreadService (service/)
//!     ├── EventBus + listeners (domain/)
//!     │
//!     ├── FileStore (storage/)
//!     │
//!     └── Database: in-memory or PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod storage;
pub mod ws;
