//! Graphline CLI - starts the line-protocol graph server.

use clap::Parser;
use colored::Colorize;
use graphline_server::{GraphServer, ServerConfig, DEFAULT_PORT};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "graphline")]
#[command(version)]
#[command(about = "Plain-text TCP server for a shared weighted digraph", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind; use 0.0.0.0 for remote access
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Seconds of client silence before a session is dropped
    #[arg(long, default_value_t = 30)]
    idle_timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = ServerConfig {
        addr: SocketAddr::new(cli.bind, cli.port),
        idle_timeout: Duration::from_secs(cli.idle_timeout),
    };

    if let Err(e) = GraphServer::new(config).run().await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
