//! Implementation of the `husky get` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::commands::load_environment;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::ConfigEnvironment;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Property keys to print
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Value printed for keys no source defines
    #[arg(short, long)]
    pub default: Option<String>,
}

/// One looked-up key.
#[derive(Debug, Serialize)]
pub struct PropertyValue {
    /// Requested key.
    pub key: String,
    /// Value from the highest-precedence source, or the default.
    pub value: Option<String>,
    /// Where the value was defined; `None` for defaults and missing keys
    pub origin: Option<String>,
}

/// Output of `husky get`.
#[derive(Debug, Serialize)]
pub struct GetOutput {
    /// Values in the order the keys were given.
    pub properties: Vec<PropertyValue>,
}

impl CommandOutput for GetOutput {
    fn to_human(&self) -> String {
        self.properties
            .iter()
            .map(|p| match (&p.value, &p.origin) {
                (Some(value), Some(origin)) => format!("{} = {value}  ({origin})", p.key),
                (Some(value), None) => format!("{} = {value}", p.key),
                (None, _) => format!("{} is not set", p.key),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Look up every requested key in `environment`.
pub fn lookup(environment: &ConfigEnvironment, args: &GetArgs) -> GetOutput {
    let properties = args
        .keys
        .iter()
        .map(|key| match environment.property(key) {
            Some(entry) => PropertyValue {
                key: key.clone(),
                value: Some(entry.value().to_string()),
                origin: Some(entry.origin().to_string()),
            },
            None => PropertyValue {
                key: key.clone(),
                value: args.default.clone(),
                origin: None,
            },
        })
        .collect();
    GetOutput { properties }
}

/// Run `husky get`.
pub fn execute(args: &GetArgs, config: &Config, json_mode: bool) -> Result<()> {
    let environment = load_environment(config)?;
    output(&lookup(&environment, args), json_mode);
    Ok(())
}
