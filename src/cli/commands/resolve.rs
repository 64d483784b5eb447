//! Implementation of the `husky resolve` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::commands::load_environment;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Text containing ${key} or ${key:default} placeholders
    pub text: String,
}

/// Output of `husky resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    /// Input text.
    pub text: String,
    /// Text with every placeholder replaced.
    pub resolved: String,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        self.resolved.clone()
    }
}

/// Run `husky resolve`.
pub fn execute(args: &ResolveArgs, config: &Config, json_mode: bool) -> Result<()> {
    let environment = load_environment(config)?;
    let resolved = environment
        .resolve(&args.text)
        .with_context(|| format!("Failed to resolve \"{}\"", args.text))?;
    output(
        &ResolveOutput {
            text: args.text.clone(),
            resolved,
        },
        json_mode,
    );
    Ok(())
}
