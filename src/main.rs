use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use profit_calc::cli::{self, Cli};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(Cli::parse()).await {
        error!("{e}");
        std::process::exit(1);
    }
}
