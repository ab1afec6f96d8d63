//! Main entry point for the users API binary

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use users_core::{
    config::LoggingConfig, create_app, get_database_pool, run_migrations, run_server, AppConfig,
    AppState, HttpFileSource,
};

#[derive(Parser, Debug)]
#[command(name = "users-api", version, about = "HTTP API for users and their files")]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config.logging);

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Database URL: {}", config.database.url);
    info!("File source URL: {}", config.file_source.url);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid bind address")?;

    let pool = get_database_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    if config.database.migrate_on_start {
        run_migrations(pool.clone())
            .await
            .context("Failed to run database migrations")?;
    }

    let file_source = HttpFileSource::from_config(&config.file_source)?;

    if config.users.enforce_file_ownership {
        info!("File ownership checks enabled");
    }

    let state = AppState::from_parts(pool, Arc::new(file_source), &config);
    info!("App: {} v{}", state.app_name, state.version);

    let app = create_app(state, &config);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_log_filter(&config.level).into());

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or_else(|_| config.format == "json");

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}

fn default_log_filter(level: &str) -> String {
    format!(
        "{crate_name}={level},users_core={level},tower_http={level}",
        crate_name = env!("CARGO_CRATE_NAME"),
        level = level
    )
}
