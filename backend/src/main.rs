//! Service entry-point: wires configuration, storage, and REST endpoints.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use matchwire::server::{self, ServerConfig};

/// Command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "matchwire", about = "Mutual-match relationship service")]
struct Cli {
    /// Socket address to bind.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: std::net::SocketAddr,

    /// PostgreSQL connection URL. Falls back to $DATABASE_URL; when neither
    /// is set, the server keeps state in memory.
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum connections in the database pool.
    #[arg(long, default_value_t = 10)]
    pool_size: u32,
}

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

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok());

    let mut config = ServerConfig::new(cli.bind).with_pool_size(cli.pool_size);
    if let Some(url) = database_url {
        config = config.with_database_url(url);
    }

    server::run(config).await
}
