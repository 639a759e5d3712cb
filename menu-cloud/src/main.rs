use std::net::SocketAddr;
use std::time::Duration;

use menu_cloud::error::BoxError;
use menu_cloud::{AppState, Config, api, db};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting menu-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::router(state.clone());

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    // Orphaned image files: written before their row was committed, or
    // superseded and no longer referenced
    if config.orphan_sweep_interval_secs > 0 {
        let sweep_state = state.clone();
        let every = Duration::from_secs(config.orphan_sweep_interval_secs);
        let grace = Duration::from_secs(config.orphan_grace_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                sweep_orphans(&sweep_state, grace).await;
            }
        });
    }

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("menu-cloud HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn sweep_orphans(state: &AppState, grace: Duration) {
    let live = match db::images::live_hashes(&state.pool).await {
        Ok(live) => live,
        Err(e) => {
            tracing::warn!("Orphan sweep skipped: {e}");
            return;
        }
    };
    let pool = state.pool.clone();
    let still_live = move |hash: String| {
        let pool = pool.clone();
        // On a lookup error the file stays
        async move { db::images::is_live(&pool, &hash).await.unwrap_or(true) }
    };
    match state.images.sweep_orphans(&live, grace, still_live).await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Orphaned image files removed"),
        Err(e) => tracing::warn!("Orphan sweep failed: {e}"),
    }
}
