//! maven-version-mcp: MCP server that reports the latest published version
//! of a Maven artifact from Maven Central.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use maven_version_mcp::config;
use maven_version_mcp::maven::MavenCentralClient;
use maven_version_mcp::mcp::server::McpServer;

/// MCP server that looks up the latest published version of a Maven artifact.
///
/// Speaks JSON-RPC 2.0 over stdin/stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "maven-version-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Override the search endpoint URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// stdout carries protocol messages, so everything goes to stderr.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the maven-version-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let mut cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(base_url) = args.base_url {
        cfg.maven.base_url = base_url;
        if let Err(e) = cfg.validate() {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %cfg.maven.base_url,
        "Starting maven-version-mcp server"
    );

    let client = match MavenCentralClient::new(&cfg.maven) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create search client");
            return ExitCode::FAILURE;
        }
    };

    let mut server = McpServer::new(client);

    info!("MCP server ready, waiting for client connection...");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
