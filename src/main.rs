use clap::{Parser, ValueEnum};
use prodx_api::RestApi;
use prodx_core::{AppContext, ContextConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Load the real catalog and index artifacts from disk
    Live,
    /// Serve a fixed in-memory catalog, no files needed
    Mock,
}

/// Product search and recommendation API
#[derive(Parser, Debug)]
#[command(name = "prodx")]
#[command(about = "Product search and recommendation API", long_about = None)]
struct Args {
    /// Backend selection
    #[arg(long, value_enum, default_value_t = Backend::Live)]
    backend: Backend,

    /// Path to the product catalog CSV
    #[arg(long, default_value = "data/cleaned_products.csv")]
    catalog: PathBuf,

    /// Path to the prebuilt vector index artifact
    #[arg(long, default_value = "models/index.bin")]
    index: PathBuf,

    /// Path to the slot metadata file
    #[arg(long, default_value = "models/meta.json")]
    meta: PathBuf,

    /// Optional CSV with per-record cluster assignments
    #[arg(long)]
    clustered: Option<PathBuf>,

    /// Text-generation service endpoint; canned output when unset
    #[arg(long)]
    generator_endpoint: Option<String>,

    /// Request-level timeout for generation calls, in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting prodx v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {:?}", args.backend);
    info!("HTTP API port: {}", args.port);

    // One atomic startup step: any missing artifact aborts the process
    // before the listener binds.
    let ctx = match args.backend {
        Backend::Live => {
            let config = ContextConfig {
                catalog_path: args.catalog,
                index_path: args.index,
                meta_path: args.meta,
                clustered_path: args.clustered,
                generator_endpoint: args.generator_endpoint,
                request_timeout: Duration::from_secs(args.request_timeout_secs),
            };
            AppContext::load(&config)?
        }
        Backend::Mock => AppContext::mock()?,
    };

    info!("HTTP API: http://localhost:{}/", args.port);
    RestApi::start(Arc::new(ctx), args.port).await?;

    info!("Shutting down...");
    Ok(())
}
