use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weather_telemetry::{
    api::{self, AppState},
    config::{Config, StoreBackend},
    db::{self, PgReadingStore},
    store::{MemoryReadingStore, ReadingStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; variables may also come from the environment
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn ReadingStore> = match &config.store {
        StoreBackend::Postgres { database_url, max_connections } => {
            let pool = db::create_pool(database_url, *max_connections).await?;
            db::run_migrations(&pool).await?;
            info!("Database ready");
            Arc::new(PgReadingStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory reading store; readings are lost on restart");
            Arc::new(MemoryReadingStore::new())
        }
    };

    let state = AppState::new(store, config.dashboard.clone());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
