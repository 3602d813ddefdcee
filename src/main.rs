//! Blog API gateway entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blog_api::api::{create_router, AppState};
use blog_api::config::Config;
use blog_api::metrics;
use blog_api::store::{fetch_collection, MongoConnector, Resource, StoreConnector};
use blog_api::GatewayError;
use blog_api::utils::{mask_secret, shutdown_signal};

/// Read-only gateway over blog, store and sensor collections.
#[derive(Parser, Debug)]
#[command(name = "blog-api")]
#[command(about = "HTTP gateway for blog posts, store products, sensor data and certificate lookups")]
#[command(version)]
struct Args {
    /// Enable verbose logging (or set VERBOSE=true).
    #[arg(short, long, global = true, env = "VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Connect to the document store and count every served collection.
    CheckStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("blog_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckStore) => cmd_check_store().await,
        Some(Command::Serve { port }) => Ok(cmd_serve(port.or(args.port)).await?),
        None => Ok(cmd_serve(args.port).await?),
    }
}

/// Load and validate configuration, logging any failure.
fn load_config() -> blog_api::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        GatewayError::InvalidConfig(e)
    })?;

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BLOG API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Shared Secret: {}", mask_secret(&config.serv));
    println!("  Static Dir: {}", config.static_dir);
    println!("  SPA Entry: {}", config.spa_index_path().display());
    println!("  Log Level: {}{}", config.rust_log, if config.verbose { " (verbose)" } else { "" });
    if config.certificate_api_configured() {
        println!(
            "  Certificate API: {} (tab {})",
            config.cert_api_base.as_deref().unwrap_or_default(),
            config.cert_api_tab.as_deref().unwrap_or_default()
        );
    } else {
        println!("  WARNING: CERT_API_BASE, CERT_API_TAB and CERT_API_SEARCH_KEY are not all set;");
        println!("           /api/certificate will return 500.");
    }
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Connect to the store and count documents in each served collection.
async fn cmd_check_store() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BLOG API - STORE CHECK");
    println!("======================================================================");

    let config = load_config()?;
    let connector: Arc<dyn StoreConnector> = Arc::new(MongoConnector::new(config.mongodb_url.clone()));

    for resource in Resource::iter() {
        print!(
            "\n{} ({}.{})... ",
            resource.route(),
            resource.database(),
            resource.collection()
        );
        let start = Instant::now();
        match fetch_collection(Arc::clone(&connector), resource).await {
            Ok(documents) => {
                println!("OK");
                println!("   Documents: {}", documents.len());
                println!("   Latency: {}ms", start.elapsed().as_millis());
            }
            Err(e) => {
                println!("FAILED");
                println!("   Error: {}", e);
            }
        }
    }

    println!("\n======================================================================");
    println!("STORE CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> blog_api::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    if config.metrics_enabled {
        metrics::install_exporter(config.metrics_port)?;
    }

    let port = config.port;
    info!("Serving frontend from {}", config.static_dir);
    let router = create_router(AppState::from_config(config)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server is active and connected at http://localhost:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
