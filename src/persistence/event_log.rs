//! Append-only PostgreSQL log of published board events.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{BoardEvent, BoardEventListener, BoardId};
use crate::error::BoardError;

/// Writes rows into the `board_events` table.
#[derive(Debug, Clone)]
pub struct PostgresEventLog {
    pool: PgPool,
}

impl PostgresEventLog {
    /// Creates a new event log over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an event to the log and returns its row id.
    ///
    /// # Errors
    ///
    /// Returns a [`BoardError::Persistence`] on database failure.
    pub async fn save_event(
        &self,
        board_id: BoardId,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, BoardError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO board_events (board_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(board_id.get())
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BoardError::Persistence(e.to_string()))?;

        Ok(row)
    }
}

/// Listener persisting every event through a [`PostgresEventLog`].
#[derive(Debug, Clone)]
pub struct EventLogListener {
    log: PostgresEventLog,
}

impl EventLogListener {
    /// Creates a listener writing to `log`.
    #[must_use]
    pub fn new(log: PostgresEventLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl BoardEventListener for EventLogListener {
    fn name(&self) -> &'static str {
        "event_log"
    }

    async fn handle(&self, event: &BoardEvent) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize board event");
                return;
            }
        };
        if let Err(e) = self
            .log
            .save_event(event.board_id(), event.event_type_str(), &payload)
            .await
        {
            tracing::error!(
                board_id = %event.board_id(),
                event_type = event.event_type_str(),
                error = %e,
                "failed to append board event"
            );
        }
    }
}
