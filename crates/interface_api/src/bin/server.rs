//! Hospital API server
//!
//! # Usage
//!
//! ```bash
//! HOSPITAL_DATABASE_URL=postgres://... HOSPITAL_JWT_SECRET=... cargo run --bin hospital-api
//! ```
//!
//! # Environment Variables
//!
//! * `HOSPITAL_HOST` - Server host (default: 0.0.0.0)
//! * `HOSPITAL_PORT` - Server port (default: 8080)
//! * `HOSPITAL_JWT_SECRET` - JWT signing secret (required in production)
//! * `HOSPITAL_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `HOSPITAL_DATABASE_URL` - PostgreSQL connection string
//! * `HOSPITAL_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `HOSPITAL_TIMEZONE` - IANA timezone of the hospital (default: America/Bogota)
//! * `HOSPITAL_ORDER_NUMBER_CAPACITY` - Size of the order-number space (default: 999999)
//! * `HOSPITAL_BILLING__MAX_ANNUAL_COPAYMENT` - Annual copayment ceiling (default: 1000000)
//! * `HOSPITAL_BILLING__STANDARD_COPAYMENT` - Copayment per order (default: 50000)
//! * `HOSPITAL_BILLING__CURRENCY` - Billing currency (default: COP)

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router, AppState};
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting hospital API server"
    );

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("running migrations")?;

    let state = AppState::postgres(pool, config.clone()).context("wiring services")?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
