//! Record book - 4-H project and resume records

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recordbook::{
    config::{Args, LogFormat, StoreKind},
    db::{MongoClient, Stores},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let mut args = Args::parse();

    init_tracing(&args);

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Record Book - 4-H Project Records");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Store: {:?}", args.store);
    if args.store == StoreKind::Mongo {
        info!("MongoDB: {} (db: {})", args.mongodb_uri, args.mongodb_db);
    }
    info!("Request timeout: {} ms", args.request_timeout_ms);
    info!("UPC lookup: {}", args.upc_api_url);
    info!("======================================");

    let stores = match args.store {
        StoreKind::Memory => {
            warn!("Using in-memory store - records are lost on restart");
            Stores::memory()
        }
        StoreKind::Mongo => match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                Stores::mongo(&client).await?
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    args.store = StoreKind::Memory;
                    Stores::memory()
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        },
    };

    let state = Arc::new(AppState::new(args, stores)?);
    server::run(state).await?;

    info!("Record book stopped");
    Ok(())
}

/// Plain or JSON log lines, filtered by RUST_LOG or LOG_LEVEL
fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("recordbook={},info", args.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
    }
}
