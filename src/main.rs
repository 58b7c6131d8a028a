use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use leadform::config::{Config, StoreConfig};
use leadform::store::{FileSlots, JournalStore, SubmissionStore, TableStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().expect("Failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting leadform");

    let store: Arc<dyn SubmissionStore> = match &config.store {
        StoreConfig::Table { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations applied");
            Arc::new(TableStore::new(pool))
        }
        StoreConfig::Journal {
            dir,
            quota_bytes,
            retention,
        } => {
            let slots = FileSlots::open(dir.clone(), *quota_bytes).await?;
            tracing::info!(
                "Journal at {} ({quota_bytes} byte quota, {retention} entries kept on overflow)",
                slots.dir().display()
            );
            Arc::new(JournalStore::new(Arc::new(slots)).with_retention(*retention))
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let window = Duration::from_secs(config.rate_limit_window_secs.max(1));
    let (app, state) = leadform::build_app(store, config);

    // Forget clients whose rate-limit window has long passed.
    let limiter_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window * 5);
        loop {
            interval.tick().await;
            limiter_state.submission_limiter.cleanup(window * 2);
        }
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
