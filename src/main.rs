//! `tasktrack` HTTP server.
//!
//! Loads `.env`, reads [`AppConfig`] from the environment, wires the selected
//! repository into the router and serves until Ctrl-C or SIGTERM.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use tasktrack::api::{self, AppState};
use tasktrack::config::{AppConfig, ConfigurationError, StorageMode};
use tasktrack::task::adapters::{
    SimulatedWork, memory::InMemoryTaskRepository, postgres::PostgresTaskRepository,
};
use tasktrack::telemetry;
use tokio::net::TcpListener;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv = dotenvy::dotenv();
    telemetry::init_tracing();
    if let Err(err) = dotenv
        && !err.not_found()
    {
        tracing::warn!(error = %err, "failed to load .env");
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        storage_mode = ?config.storage_mode,
        processing_delay = ?config.processing_delay,
        "starting task tracking API"
    );

    let clock = Arc::new(DefaultClock);
    let work = Arc::new(SimulatedWork::new(config.processing_delay));
    let app = match config.storage_mode {
        StorageMode::InMemory => {
            let repository = Arc::new(InMemoryTaskRepository::new());
            api::router(AppState::new(repository, clock, work))
        }
        StorageMode::Postgres => {
            let repository = Arc::new(connect_postgres(&config).await?);
            api::router(AppState::new(repository, clock, work))
        }
    };

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn connect_postgres(config: &AppConfig) -> Result<PostgresTaskRepository, BoxError> {
    let url = config
        .database_url
        .clone()
        .ok_or(ConfigurationError::MissingDatabaseUrl)?;
    let max_size = config.database_pool_size;
    let pool = tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(max_size)
            .build(ConnectionManager::<PgConnection>::new(url))
    })
    .await??;

    let repository = PostgresTaskRepository::new(pool);
    repository.ensure_schema().await?;
    tracing::info!("database schema ready");
    Ok(repository)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
