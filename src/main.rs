use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_api::config::ServerConfig;
use todo_api::routes::create_router;
use todo_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting to-do API service");

    let config = ServerConfig::from_env();

    // Store is created empty and lives for the process lifetime
    let app_state = AppState::new();

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("To-do API service listening on {}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
