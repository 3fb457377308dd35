//! Parent thread referenced by boards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ThreadId;

/// A discussion container that boards are posted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    /// Thread identifier.
    pub id: ThreadId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
