//! # Statute Search Engine Main Driver
//!
//! ## Purpose
//! Main entry point for the statute search server. Orchestrates
//! initialization of all system components and starts the web server for
//! handling retrieval requests.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Either run the offline ingestion pipeline, or
//! 4. Load the corpus, build both indices, and start the API server
//! 5. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use statute_search::{
    api::ApiServer,
    config::Config,
    embedding::{Embedder, HashingEmbedder, HttpEmbedder},
    errors::Result,
    ingestion::IngestionPipeline,
    retrieval::RetrievalService,
    store::ChunkStore,
    AppState, SearchError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("statute-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Hybrid lexical+semantic retrieval engine for Indian statute law")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("ingest")
                .long("ingest")
                .help("Run the offline ingestion pipeline and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Run health checks and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config)?;

    info!("Starting Statute Search Engine v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    if matches.get_flag("check-health") {
        return run_health_checks(&config);
    }

    if matches.get_flag("ingest") {
        let pipeline = IngestionPipeline::new(&config);
        let stats = pipeline.run()?;
        info!(
            "Ingestion finished: {} IPC chunks, {} CRPC chunks from {} pages",
            stats.ipc_chunks, stats.crpc_chunks, stats.pages_seen
        );
        return Ok(());
    }

    // Serving mode: corpus and indices are built once, then shared read-only.
    let app_state = initialize_components(config.clone()).await?;

    let server = ApiServer::new(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Statute Search Engine started successfully on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Statute Search Engine shut down successfully");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

/// Initialize all application components
async fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Initializing application components...");

    let embedder: Arc<dyn Embedder> = match &config.vector.embedding_endpoint {
        Some(endpoint) => {
            info!("Using embedding provider at {}", endpoint);
            Arc::new(HttpEmbedder::new(
                endpoint.clone(),
                config.vector.dimension,
                config.vector.batch_size,
                config.vector.embed_concurrency,
            ))
        }
        None => {
            warn!("No embedding endpoint configured; using deterministic hashing embedder");
            Arc::new(HashingEmbedder::new(config.vector.dimension))
        }
    };

    let store = ChunkStore::new(&config.storage.chunks_dir);
    let retrieval = Arc::new(RetrievalService::build(&store, embedder, &config).await?);

    info!("All components initialized successfully");
    Ok(AppState { config, retrieval })
}

/// Run health checks without starting the server
fn run_health_checks(config: &Config) -> Result<()> {
    info!("Running health checks...");

    info!("✓ Configuration is valid");

    if !config.storage.chunks_dir.exists() {
        return Err(SearchError::EmptyCorpus {
            path: config.storage.chunks_dir.display().to_string(),
        });
    }
    info!("✓ Chunk corpus directory exists");

    let store = ChunkStore::new(&config.storage.chunks_dir);
    let chunks = store.load_all()?;
    info!("✓ Corpus loads: {} chunks", chunks.len());

    info!("All health checks passed!");
    Ok(())
}
