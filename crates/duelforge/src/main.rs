//! The duelforge server binary.

use clap::Parser;
use duelforge::{DuelforgeError, Server};

/// Text-protocol multiplayer battle arena server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Address to listen on.
    #[clap(short, long, default_value = "0.0.0.0:51621")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), DuelforgeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let server = Server::builder().bind(&args.bind).build().await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "listening");
    }
    server.run().await
}
