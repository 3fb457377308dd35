//! drawwang-board server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use drawwang_board::api;
use drawwang_board::app_state::AppState;
use drawwang_board::config::{BoardConfig, LogFormat};
use drawwang_board::domain::{ActivityLogListener, EventBus};
use drawwang_board::persistence::Database;
use drawwang_board::persistence::event_log::{EventLogListener, PostgresEventLog};
use drawwang_board::persistence::memory::MemoryDatabase;
use drawwang_board::persistence::postgres::PostgresDatabase;
use drawwang_board::service::{BoardService, ThreadService};
use drawwang_board::storage::LocalFileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = BoardConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting drawwang-board");

    // Build domain layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    event_bus.spawn_listener(ActivityLogListener);

    // Build persistence layer
    let database: Arc<dyn Database> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("connected to PostgreSQL, migrations applied");

        if config.event_log_enabled {
            event_bus.spawn_listener(EventLogListener::new(PostgresEventLog::new(pool.clone())));
        }
        Arc::new(PostgresDatabase::new(pool))
    } else {
        tracing::warn!("persistence disabled, boards live in memory only");
        Arc::new(MemoryDatabase::new())
    };

    let file_store = Arc::new(
        LocalFileStore::new(config.upload_dir.clone(), config.image_url_prefix.clone()).await?,
    );

    // Build service layer
    let board_service = Arc::new(BoardService::new(
        Arc::clone(&database),
        file_store,
        event_bus.clone(),
    ));
    let thread_service = Arc::new(ThreadService::new(database));

    // Build application state
    let app_state = AppState {
        board_service,
        thread_service,
        event_bus,
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = api::build_app(app_state, &config.upload_dir, &config.image_url_prefix);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
