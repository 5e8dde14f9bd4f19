use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gemgate::{
    aggregate::Aggregator,
    config::{Config, DEFAULT_ADDR, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS},
    directory::Directory,
    http::build_http_client,
    server,
    upstream::UpstreamClient,
};
use log::info;
use tokio::net::TcpListener;

/// gemgate - one RubyGems source in front of many
///
/// Merges the dependency API of several upstream gem repositories, in the
/// order given, and redirects gem downloads to whichever upstream served
/// the gem.
///
/// Examples:
///   gemgate --repo https://gems.internal.example.com --repo https://rubygems.org
#[derive(Parser, Debug)]
#[command(author, version = env!("GEMGATE_VERSION"), about)]
struct Cli {
    /// URL of an upstream RubyGems repository. Repeat in order of priority.
    #[arg(
        long = "repo",
        value_name = "URL",
        env = "GEMGATE_REPOS",
        value_delimiter = ','
    )]
    repos: Vec<String>,

    /// Address to bind the server to
    #[arg(long = "addr", value_name = "IP", env = "GEMGATE_ADDR", default_value = DEFAULT_ADDR)]
    addr: IpAddr,

    /// Port to listen on
    #[arg(long = "port", short = 'p', env = "GEMGATE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Timeout for each upstream request, in seconds
    #[arg(
        long = "timeout",
        value_name = "SECS",
        env = "GEMGATE_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::new(&cli.repos, cli.addr, cli.port, cli.timeout)?;

    let http_client = build_http_client(config.timeout)?;
    let aggregator = Aggregator::new(
        Arc::new(UpstreamClient::new(http_client)),
        config.repositories,
        Arc::new(Directory::new()),
    );

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind to address: {}", config.listen))?;

    server::serve(listener, aggregator, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down...");
        }
    })
    .await
}
