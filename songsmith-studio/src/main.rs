//! songsmith-studio - Songwriting assistant service
//!
//! Serves the drafts, collected lines and shared reference lyrics of
//! anonymous users, and brokers song generation, creative tools and synonym
//! lookup. Live changes stream over SSE.

use anyhow::{Context, Result};
use clap::Parser;
use songsmith_common::config::{
    default_config_path, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use songsmith_common::events::EventBus;
use songsmith_studio::services::{GenerationClient, ThesaurusClient};
use songsmith_studio::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songsmith-studio
#[derive(Parser, Debug)]
#[command(name = "songsmith-studio")]
#[command(about = "Songwriting assistant service")]
#[command(version)]
struct Args {
    /// Folder holding the database (overrides SONGSMITH_ROOT_FOLDER and TOML)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: ~/.config/songsmith/songsmith.toml)
    #[arg(short, long, env = "SONGSMITH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "SONGSMITH_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "SONGSMITH_BIND_ADDRESS")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The log level lives in the TOML file, so load it before tracing
    let config_path = args.config.clone().or_else(default_config_path);
    let (toml_config, config_origin) = TomlConfig::load_or_default(config_path.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Songsmith Studio (songsmith-studio) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_origin.log();

    // Step 1: Resolve root folder
    let resolver = RootFolderResolver::new(args.root_folder.clone(), &toml_config);
    let root_folder = resolver.resolve();

    // Step 2: Create root folder directory if missing
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    // Step 3: Open or create database
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = songsmith_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    // Step 4: Outbound clients
    let api_key =
        songsmith_studio::config::resolve_generation_api_key(&db_pool, &toml_config).await?;
    let generation_api_key = Arc::new(RwLock::new(api_key));
    let generation_config =
        songsmith_studio::config::load_generation_config(&db_pool, &toml_config).await?;
    let generator = GenerationClient::new(Arc::clone(&generation_api_key), generation_config)
        .context("Failed to build generation client")?;
    let thesaurus = ThesaurusClient::new(songsmith_studio::config::thesaurus_endpoint(&toml_config))
        .context("Failed to build thesaurus client")?;

    let event_bus = EventBus::new(100);
    info!("Event bus initialized (capacity {})", event_bus.capacity());

    let state = AppState::new(
        db_pool,
        event_bus,
        Arc::new(generator),
        Arc::new(thesaurus),
        generation_api_key,
    );
    let app = songsmith_studio::build_router(state);

    // Step 5: Serve
    let defaults = CompiledDefaults::for_current_platform();
    let bind_address = args
        .bind_address
        .or(toml_config.bind_address.clone())
        .unwrap_or(defaults.bind_address);
    let port = args.port.or(toml_config.port).unwrap_or(defaults.port);

    let listener = tokio::net::TcpListener::bind((bind_address.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind_address, port))?;
    info!("Listening on http://{}:{}", bind_address, port);
    info!("Health check: http://{}:{}/health", bind_address, port);

    axum::serve(listener, app).await?;

    Ok(())
}
