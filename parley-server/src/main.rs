use anyhow::Result;
use clap::Parser;
use parley_server::{RelayHub, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley-server", about = "Signaling relay for two-party calls")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let hub = RelayHub::new();

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!("listening on {}", args.addr);
    axum::serve(listener, router(hub)).await?;

    Ok(())
}
