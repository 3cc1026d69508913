//! MediaVault server — media asset ingestion and deduplication engine.
//!
//! Main entry point that wires configuration, database, and the API
//! crate together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use mediavault_core::config::AppConfig;
use mediavault_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MEDIAVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MediaVault v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = mediavault_database::connection::create_pool(&config.database).await?;
    mediavault_database::migration::run_migrations(&db_pool).await?;

    mediavault_api::run_server(config, db_pool).await
}
