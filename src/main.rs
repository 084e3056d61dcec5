//! registry-sync: keeps a local mirror of the on-chain service registry
//!
//! Runs a sync pass on startup and then periodically, and serves the compiled
//! service schemas over HTTP. See `registry_sync` for the pipeline itself.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use registry_sync::content::IpfsClient;
use registry_sync::ledger::EthRegistryClient;
use registry_sync::schema::ProtoxCompiler;
use registry_sync::store::SqliteStore;
use registry_sync::{api, sync, Config, SchemaRegistry, Syncer};

#[derive(Parser)]
#[command(name = "registry-sync")]
#[command(about = "Mirrors the on-chain service registry and indexes service schemas")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "REGISTRY_SYNC_CONFIG", default_value = "registry-sync.toml")]
    config: String,

    /// SQLite database path (overrides config file)
    #[arg(short, long, env = "REGISTRY_SYNC_DATABASE")]
    database: Option<String>,

    /// Ledger JSON-RPC endpoint (overrides config file)
    #[arg(long, env = "REGISTRY_SYNC_RPC_URL")]
    rpc_url: Option<String>,

    /// IPFS API endpoint (overrides config file)
    #[arg(long, env = "REGISTRY_SYNC_IPFS_URL")]
    ipfs_url: Option<String>,

    /// Run a single sync pass and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry_sync=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting registry-sync");
    info!("Config file: {}", cli.config);

    // Load or create default config
    let mut config = if Path::new(&cli.config).exists() {
        Config::load(Path::new(&cli.config))?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(database) = cli.database {
        config.storage.database_path = PathBuf::from(database);
    }
    if let Some(rpc_url) = cli.rpc_url {
        config.ledger.rpc_url = rpc_url;
    }
    if let Some(ipfs_url) = cli.ipfs_url {
        config.ipfs.api_url = ipfs_url;
    }
    config.validate()?;

    info!("Ledger RPC: {}", config.ledger.rpc_url);
    info!("Registry contract: {}", config.ledger.registry_address);
    info!("IPFS API: {}", config.ipfs.api_url);
    info!("Database: {}", config.storage.database_path.display());

    let ledger = EthRegistryClient::new(
        &config.ledger.rpc_url,
        &config.ledger.registry_address,
        Duration::from_secs(config.ledger.timeout_secs),
    )?;
    let ipfs = IpfsClient::new(
        &config.ipfs.api_url,
        Duration::from_secs(config.ipfs.timeout_secs),
    )?;
    let store = SqliteStore::open(&config.storage.database_path)?;

    // One registry shared by the syncer (writer) and the API (readers)
    let registry = Arc::new(SchemaRegistry::new());

    let syncer = Syncer::new(
        Arc::new(ledger),
        Arc::new(ipfs),
        Arc::new(store),
        Arc::new(ProtoxCompiler::new()),
        registry.clone(),
    )
    .with_policy(config.sync_policy());

    if cli.once {
        syncer.run_pass().await;
        return Ok(());
    }

    let shutdown = CancellationToken::new();

    let sync_shutdown = shutdown.clone();
    let period = config.sync_interval();
    let sync_task = tokio::spawn(async move {
        sync::run_periodic(&syncer, period, sync_shutdown).await;
    });

    let api_task = if config.api.enabled {
        let app = api::create_router(registry);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API listening on http://{}", addr);

        let api_shutdown = shutdown.clone();
        Some(tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { api_shutdown.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "API server failed");
            }
        }))
    } else {
        info!("API is disabled");
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, waiting for in-flight sync pass");
    shutdown.cancel();

    sync_task.await?;
    if let Some(api_task) = api_task {
        api_task.await?;
    }

    info!("Stopped");
    Ok(())
}
