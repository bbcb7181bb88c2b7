use fieldsales_dashboard::config::AppConfig;
use fieldsales_dashboard::services::refresher;
use fieldsales_dashboard::{routes, AppState};
use mimalloc::MiMalloc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsales_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    let state = AppState::new(config.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = refresher::spawn(
        state.dashboards.clone(),
        config.dashboard.refresh_interval,
        shutdown_rx,
    );

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        host = %listener.local_addr()?,
        vendor = %config.vendor.base_url,
        "Starting field-sales dashboard server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    shutdown_tx.send(true).ok();
    refresher.await?;
    Ok(())
}
