use cloudsync::db::FileCache;
use cloudsync::drive::DriveClient;
use mimalloc::MiMalloc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &cloudsync::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.listen_addr,
        database_url = %cfg.database_url,
        public_url = %cfg.public_url,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
    );

    if !cfg.client_secrets_file.exists() {
        warn!(
            path = %cfg.client_secrets_file.display(),
            "client secrets file not found; /authorize will fail until it is provided"
        );
    }
    if cfg.cookie_secret.is_none() {
        warn!("no cookie_secret configured; sessions end when the process restarts");
    }

    let cache = FileCache::connect(&cfg.database_url).await?;
    let sessions = cloudsync::service::session_actor::spawn(
        Duration::from_secs(cfg.session_ttl_secs),
        Duration::from_secs(cfg.pending_auth_ttl_secs),
    )
    .await?;

    // Only connecting is bounded; transfers may legitimately take long.
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("cloudsync/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10));
    if let Some(proxy_url) = cfg.proxy.clone() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    let http = builder.build()?;

    let drive = Arc::new(DriveClient::new(http.clone()));
    let state =
        cloudsync::router::SyncState::new(cfg, Arc::new(sessions), drive, cache, http)?;
    let app = cloudsync::router::sync_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
