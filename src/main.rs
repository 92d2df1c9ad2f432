//! career-tree binary
//!
//! Loads the dataset, connects the submission store and serves HTTP.

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use career_tree::{
    config::Args,
    db::MongoClient,
    graph::{LayeredLayout, LayoutEngine},
    logging,
    server::{self, AppState},
    submission::{
        MemorySubmissionStore, MongoSubmissionStore, SubmissionGateway, SubmissionStore,
        TokenBucket,
    },
    tree::DatasetHandle,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init_tracing(&args)?;

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  career-tree - career path explorer");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Tree data: {}", args.tree_data.display());
    info!("Metadata: {}", args.metadata_data.display());

    let layout: Arc<dyn LayoutEngine> = Arc::new(LayeredLayout);
    let source = args.dataset_source();
    let dataset = tokio::task::spawn_blocking(move || DatasetHandle::open(source, layout)).await??;
    let dataset = Arc::new(dataset);

    let snapshot = dataset.snapshot();
    let stats = snapshot.stats();
    info!(
        "Dataset: {} nodes, {} roots, {} terminals, {} unmapped children, {} orphans",
        stats.nodes, stats.roots, stats.terminals, stats.ghosts, stats.orphans
    );
    info!(
        "Metadata: {} records; map: {} nodes, {} edges",
        snapshot.metadata.len(),
        snapshot.graph.node_count(),
        snapshot.graph.edges.len()
    );
    drop(snapshot);

    let store = connect_store(&args).await?;
    info!("Submission store: {}", store.mode());

    let limiter = Arc::new(TokenBucket::new(
        args.rate_limit_tokens,
        args.rate_limit_interval(),
    ));
    info!(
        "Rate limit: {} submissions per {}s (shared)",
        limiter.capacity(),
        args.rate_limit_interval_secs
    );
    let gateway = SubmissionGateway::new(limiter, store);

    spawn_reload_on_hangup(Arc::clone(&dataset));

    let state = Arc::new(AppState::new(args, dataset, gateway));

    tokio::select! {
        result = server::run(state) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// MongoDB when reachable. In dev mode an unreachable database falls back to
/// the in-memory store; in production it is fatal.
async fn connect_store(args: &Args) -> anyhow::Result<Arc<dyn SubmissionStore>> {
    let connected = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => MongoSubmissionStore::new(&client).await,
        Err(e) => Err(e),
    };

    match connected {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable ({}), submissions kept in memory", e);
            Ok(Arc::new(MemorySubmissionStore::new()))
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            Err(e.into())
        }
    }
}

/// Reload the dataset from disk on SIGHUP
#[cfg(unix)]
fn spawn_reload_on_hangup(dataset: Arc<DatasetHandle>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Cannot listen for SIGHUP, dataset reload disabled: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!(
                tree = %dataset.source().tree_path.display(),
                "SIGHUP received, reloading dataset"
            );
            let handle = Arc::clone(&dataset);
            match tokio::task::spawn_blocking(move || handle.reload()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Dataset reload rejected: {}", e),
                Err(e) => error!("Dataset reload task failed: {}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_dataset: Arc<DatasetHandle>) {}
