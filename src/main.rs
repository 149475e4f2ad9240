use anyhow::{Context, Result};
use clap::Parser;
use polyneural_bridge::backend::BackendClient;
use polyneural_bridge::mcp::HttpBridge;
use polyneural_bridge::supervisor::Supervisor;
use polyneural_bridge::{config, serve};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "polyneural-bridge")]
#[command(about = "Stdio MCP server forwarding to the PolyNeural.ai HTTP API", long_about = None)]
#[command(version)]
struct Cli {
    /// Optional TOML file with api_url, api_key, debug, timeout, log_level, log_format
    #[arg(short, long, env = "POLYNEURAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Override log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

// Current-thread runtime: every request is an independent task on one event loop.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Configuration errors end the process here, before stdio is touched
    let mut config =
        config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = cli.log_level {
        config.logging.level = config::resolve_level(Some(log_level), config.backend.debug);
    }
    if let Some(log_format) = cli.log_format {
        config.logging.format = log_format;
    }
    config::validate_logging(&config.logging.level, &config.logging.format)?;

    init_logging(&config.logging)?;

    if config.backend.debug {
        print_banner(&config);
    }

    let backend = BackendClient::new(config.backend).context("Failed to create backend client")?;
    let supervisor = Supervisor::new();
    let bridge = HttpBridge::new(backend, supervisor.clone());

    serve::run_stdio(bridge, supervisor).await
}

fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // stdout carries protocol frames, so every log line goes to stderr
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), config.level))
    });

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

fn print_banner(config: &config::AppConfig) {
    let version = env!("CARGO_PKG_VERSION");

    info!("Starting PolyNeural.ai MCP bridge v{} (stdio → HTTP)", version);
    info!("  → API URL: {}", config.backend.api_url);
    info!("  → API key: {}", config.backend.masked_api_key());
    info!("  → Timeout: {}ms", config.backend.timeout_ms());
    info!("  → Log Level: {}", config.logging.level);
    info!("  → Log Format: {}", config.logging.format);
}
