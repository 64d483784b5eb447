use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::get::GetArgs;
use crate::cli::commands::providers::ProvidersArgs;
use crate::cli::commands::resolve::ResolveArgs;
use crate::cli::commands::sources::SourcesArgs;

#[derive(Parser, Debug)]
#[command(name = "husky")]
#[command(about = "Husky - configuration sources and capability discovery", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Read settings from this YAML file instead of .husky/config.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the property sources loaded from the configured locations
    Sources(SourcesArgs),
    /// Print property values
    Get(GetArgs),
    /// Resolve ${key} and ${key:default} placeholders in text
    Resolve(ResolveArgs),
    /// Discover the providers of a capability
    Providers(ProvidersArgs),
}
