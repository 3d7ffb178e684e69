use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watchlist_api::{
    config::Config,
    db::{create_pool, MemoryStore, PgStore, WatchStore},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchlist_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn WatchStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            tracing::info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = create_router(AppState::new(store, &config));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
