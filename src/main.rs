use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use doc_globe::config::ViewerConfig;
use doc_globe::fetch::source::{HttpPointSource, PointSource};
use doc_globe::refresh::refresh::spawn_query_refresh;
use doc_globe::scene::memory::MemoryScene;
use doc_globe::viewer::Viewer;
use log::info;

/// Headless viewer: keeps the marker scene in memory and logs every change.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load default config".to_string(),
    })?;
    info!("viewer config: {config:?}");

    let source = HttpPointSource::new(
        &config.base_url,
        &config.doc_points_path,
        &config.query_point_path,
    )
    .context("failed to build HTTP client")?
    .with_document_cache_busting(config.cache_bust_documents);
    let source = Arc::new(source);

    let mut viewer = Viewer::new(MemoryScene::new(), config.stale_responses);
    // a failed load is logged by the viewer itself
    if let Ok(count) = viewer.load_documents(source.fetch_documents().await) {
        info!("{count} documents on the globe");
    }

    let (refresh, mut updates) =
        spawn_query_refresh(Arc::clone(&source), config.refresh_period())
            .context("failed to start query refresh")?;
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                viewer.apply_query(update);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("shutting down");
                break;
            }
        }
    }

    refresh.stop().await;
    viewer.shutdown();
    info!("{} scene objects left at exit", viewer.scene().len());
    Ok(())
}
