mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use galleria::{
    config::{self, Config, StorageBackend},
    server,
    store::{FsObjectStore, ObjectStore, S3ObjectStore},
};
use galleria_db::pool::init_pool;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Galleria server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    // Determine data directory from config path or current directory
    let data_dir = config_path
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    // Initialize database
    let db_path = config
        .database
        .path
        .clone()
        .unwrap_or_else(|| data_dir.join("galleria.db"));
    tracing::info!("Initializing database at {}", db_path.display());
    let db_pool = init_pool(&db_path.to_string_lossy())?;

    // Initialize object store
    let store = build_store(&config, &data_dir).await?;

    // Start HTTP server
    server::start_server(config, db_pool, store).await
}

async fn build_store(config: &Config, data_dir: &Path) -> Result<Arc<dyn ObjectStore>> {
    match config.storage.backend {
        StorageBackend::Fs => {
            let root = data_dir.join(&config.storage.root);
            tracing::info!("Using filesystem object store at {}", root.display());
            Ok(Arc::new(FsObjectStore::new(root)))
        }
        StorageBackend::S3 => {
            let bucket = config
                .storage
                .bucket
                .clone()
                .context("Storage backend 's3' requires a bucket name")?;
            tracing::info!("Using S3 object store bucket '{}'", bucket);
            let store = S3ObjectStore::connect(
                bucket,
                config.storage.region.clone(),
                config.storage.endpoint_url.clone(),
                config.storage.force_path_style,
            )
            .await;
            Ok(Arc::new(store))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "galleria=trace,galleria_db=debug,galleria_common=debug,tower_http=debug".to_string()
        } else {
            "galleria=debug,galleria_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("galleria {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Storage backend: {:?}", config.storage.backend);
            if let Some(ref bucket) = config.storage.bucket {
                println!("  Bucket: {}", bucket);
            }
            if let Some(ref db) = config.database.path {
                println!("  Database: {}", db.display());
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Storage backend: {:?}", config.storage.backend);
        }
    }

    Ok(())
}
