use habit_web::{router, AppState, Config, Controller, LocalStore, Session};
use reqwest::Client;
use std::sync::Arc;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let store = LocalStore::open(&config.data_path).await;
    let session = Session::new(Arc::new(RwLock::new(store)));
    let controller = Controller::new(Client::new(), &config.api_url, session);
    controller.restore_session().await;

    let app = router(AppState::new(controller));

    let addr = config.bind_addr();
    info!(backend = %config.api_url, store = %config.data_path.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
