//! taskhub HTTP server.
//!
//! Reads configuration from the environment (and `.env` when present),
//! selects the storage backend and serves the task API until SIGINT or
//! SIGTERM.

use std::sync::Arc;

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use taskhub::config::{AppConfig, DEFAULT_LOG_FILTER, LogFormat, StorageConfig};
use taskhub::http::{self, AppState};
use taskhub::task::adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository};
use taskhub::task::ports::TaskRepository;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let loaded = AppConfig::from_env();
    init_tracing(
        loaded
            .as_ref()
            .map_or(LogFormat::default(), |config| config.log_format),
    );
    let config = match loaded {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };

    tracing::info!("starting taskhub");

    let repository = match build_repository(&config.storage).await {
        Ok(repository) => repository,
        Err(error) => {
            tracing::error!(%error, "failed to initialize task storage");
            std::process::exit(1);
        }
    };

    let cors = match http::cors_layer(config.cors_origin.as_deref()) {
        Ok(cors) => cors,
        Err(error) => {
            tracing::error!(%error, "invalid CORS_ORIGIN");
            std::process::exit(1);
        }
    };
    let application = http::router(AppState::new(repository)).layer(cors);

    let address = match config.bind_address() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, host = %config.host, port = config.port, "invalid server address");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %address, "failed to bind");
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(local) => tracing::info!(address = %local, "listening"),
        Err(error) => tracing::warn!(%error, "could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }

    tracing::info!("server shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn build_repository(
    storage: &StorageConfig,
) -> Result<Arc<dyn TaskRepository>, Box<dyn std::error::Error + Send + Sync>> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory task storage");
            Ok(Arc::new(InMemoryTaskRepository::new()))
        }
        StorageConfig::Postgres {
            database_url,
            pool_size,
        } => {
            let manager = ConnectionManager::<PgConnection>::new(database_url.as_str());
            let max_size = *pool_size;
            let pool = tokio::task::spawn_blocking(move || {
                Pool::builder().max_size(max_size).build(manager)
            })
            .await??;
            let repository = PostgresTaskRepository::new(pool);
            repository.ensure_schema().await?;
            tracing::info!(pool_size = max_size, "using PostgreSQL task storage");
            Ok(Arc::new(repository))
        }
    }
}

/// Completes on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
