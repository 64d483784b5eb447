//! Husky CLI entry point.

use anyhow::Result;
use clap::Parser;

use husky::cli::commands::{get, providers, resolve, sources};
use husky::cli::{Cli, Commands};
use husky::infrastructure::config::ConfigLoader;
use husky::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        husky::cli::handle_error(err, cli.json);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match &cli.command {
        Commands::Sources(args) => sources::execute(args, &config, cli.json),
        Commands::Get(args) => get::execute(args, &config, cli.json),
        Commands::Resolve(args) => resolve::execute(args, &config, cli.json),
        Commands::Providers(args) => providers::execute(args, &config, cli.json).await,
    }
}
