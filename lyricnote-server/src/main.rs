//! lyricnote-server - Main entry point
//!
//! Resolves the root folder, opens (or creates) the database and serves the
//! HTTP API until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lyricnote_common::config::{
    config_file_path, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use lyricnote_server::services::LyricsClient;
use lyricnote_server::{build_router, AppState};

/// Command-line arguments for lyricnote-server
#[derive(Parser, Debug)]
#[command(name = "lyricnote-server")]
#[command(about = "Lyrics annotation service")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "LYRICNOTE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "LYRICNOTE_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config file)
    #[arg(short, long, env = "LYRICNOTE_BIND")]
    bind: Option<String>,

    /// Base URL of the lyrics API (overrides config file)
    #[arg(long, env = "LYRICNOTE_LYRICS_API")]
    lyrics_api: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = TomlConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lyricnote_server={level},lyricnote_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting lyricnote-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match (&loaded, config_file_path()) {
        (Err(e), _) => warn!("Ignoring config file, using defaults: {}", e),
        (Ok(_), Some(path)) => info!("Config file: {}", path.display()),
        (Ok(_), None) => info!("No config file found, using defaults"),
    }

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_toml_root(config.root_folder.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match lyricnote_common::db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let lyrics_api = args.lyrics_api.unwrap_or(config.lyrics_api_base);
    let lyrics = LyricsClient::new(&lyrics_api, config.lyrics_rate_limit_ms)
        .context("Failed to build lyrics API client")?;
    info!("Lyrics API: {}", lyrics_api);

    let app = build_router(AppState::new(pool, lyrics));

    let bind = args.bind.unwrap_or(config.bind);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("lyricnote-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
