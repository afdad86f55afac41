use clap::Parser;
use tracing_subscriber::EnvFilter;

use savevault::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
