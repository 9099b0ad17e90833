//! Backend entry-point: wires REST endpoints, the WebSocket feed, and
//! OpenAPI docs over a PostgreSQL record store.

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::server::{create_server, ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::parse();
    info!(bind_addr = %config.bind_addr, "starting scoreboard backend");

    let server = create_server(config).await?;
    server.await
}
