//! Classified Extract CLI
//!
//! Runs the ingestion server, or extracts a single listing from a file or URL.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use classified_extract::config::{ServerConfig, StoreConfig};
use classified_extract::extraction::{ListingExtractor, ListingRecord};
use classified_extract::handlers::{router, AppState};
use classified_extract::retriever::HttpRetriever;
use classified_extract::store::{JsonLinesStore, MemoryStore, RecordStore};
use classified_extract::Pipeline;

/// Classified listing extractor
#[derive(Parser, Debug)]
#[command(name = "clx")]
#[command(version)]
#[command(about = "Extract structured records from classified listing pages")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP ingestion server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<IpAddr>,

        /// Store records as JSON lines under this directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Accept listings without a photo container
        #[arg(long)]
        lenient_thumbnails: bool,
    },

    /// Extract a listing from a saved HTML file
    Extract {
        /// HTML file to read
        file: PathBuf,

        /// Source URL to attach to the record
        #[arg(long)]
        url: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Accept listings without a photo container
        #[arg(long)]
        lenient_thumbnails: bool,
    },

    /// Fetch a listing URL and print its record without storing it
    Fetch {
        /// Listing URL
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve {
            port,
            host,
            data_dir,
            lenient_thumbnails,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(dir) = data_dir {
                config.store = StoreConfig::JsonLines(dir);
            }
            if lenient_thumbnails {
                config.extract.require_thumbnails = false;
            }
            serve(config).await
        }
        Command::Extract {
            file,
            url,
            pretty,
            lenient_thumbnails,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut options = ServerConfig::from_env()?.extract;
            if lenient_thumbnails {
                options.require_thumbnails = false;
            }
            let mut record = ListingExtractor::with_options(options).extract(&raw)?;
            if let Some(url) = url {
                record = record.with_url(url);
            }
            print_record(&record, pretty)
        }
        Command::Fetch { url, pretty } => {
            let config = ServerConfig::from_env()?;
            let pipeline = build_pipeline(&config)?;
            let record = pipeline.preview(&url).await?;
            print_record(&record, pretty)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_pipeline(config: &ServerConfig) -> anyhow::Result<Pipeline> {
    let store: Arc<dyn RecordStore> = match &config.store {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::JsonLines(dir) => Arc::new(
            JsonLinesStore::open(dir)
                .with_context(|| format!("opening data directory {}", dir.display()))?,
        ),
    };
    let retriever = HttpRetriever::new(&config.retriever)?;
    Ok(Pipeline::new(retriever, store, config.extract))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.log_summary();

    let pipeline = build_pipeline(&config)?;
    let state = Arc::new(AppState::new(pipeline));
    let app = router(state, &config.cors_origins);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, version = classified_extract::VERSION, "clx listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}

fn print_record(record: &ListingRecord, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    println!("{json}");
    Ok(())
}
