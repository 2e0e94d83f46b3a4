use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{Level, info};

use common::storage::filesystem::FilesystemImageStore;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    let images = FilesystemImageStore::new(
        PathBuf::from(&config.storage.image_dir),
        config.storage.max_image_size,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        images: Arc::new(images),
        config: Arc::new(config),
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
