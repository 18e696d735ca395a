use anyhow::Context;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tubely::common::upload::MAX_UPLOAD_SIZE;
use tubely::config::settings::AppConfig;
use tubely::infrastructure::db::pool::{connect_to_db, run_migrations};
use tubely::infrastructure::storage;
use tubely::modules::video::repository::VideoRepository;
use tubely::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubely=debug,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("loading configuration")?;

    let db = connect_to_db(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    run_migrations(&db).await.context("running migrations")?;

    let thumbnails = storage::from_config(&config, MAX_UPLOAD_SIZE).await?;
    let videos = Arc::new(VideoRepository::new(db));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(config, videos, thumbnails);
    let app = tubely::app::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
