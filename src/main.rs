//! Learn Engine - terminal player for micro-lesson nodes

use clap::Parser;
use learn_engine::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = cli::load_config(&args)?;

    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::run(args, config)
}
