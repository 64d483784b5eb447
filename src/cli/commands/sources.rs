//! Implementation of the `husky sources` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::commands::load_environment;
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, PropertySource};

#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Also list every property with its origin
    #[arg(short, long)]
    pub properties: bool,
}

/// A property listed with `--properties`.
#[derive(Debug, Serialize)]
pub struct PropertyLine {
    /// Property key.
    pub key: String,
    /// Raw value.
    pub value: String,
    /// File, line and column that defined it.
    pub origin: String,
}

/// One loaded property source.
#[derive(Debug, Serialize)]
pub struct SourceSummary {
    /// Source name.
    pub name: String,
    /// Number of properties.
    pub entries: usize,
    /// Properties, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyLine>,
}

/// Output of `husky sources`.
#[derive(Debug, Serialize)]
pub struct SourcesOutput {
    /// Sources from highest to lowest precedence.
    pub sources: Vec<SourceSummary>,
}

impl SourceSummary {
    fn from_source(source: &PropertySource, with_properties: bool) -> Self {
        let properties = if with_properties {
            source
                .entries()
                .map(|entry| PropertyLine {
                    key: entry.key().to_string(),
                    value: entry.value().to_string(),
                    origin: entry.origin().to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            name: source.name().to_string(),
            entries: source.len(),
            properties,
        }
    }
}

impl CommandOutput for SourcesOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["precedence", "name", "entries"]);
        for (i, source) in self.sources.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                source.name.clone(),
                source.entries.to_string(),
            ]);
        }

        let mut rendered = render_list("property source", &table, self.sources.len());
        for source in self.sources.iter().filter(|s| !s.properties.is_empty()) {
            rendered.push_str(&format!("\n\n[{}]", source.name));
            for line in &source.properties {
                rendered.push_str(&format!("\n  {} = {}  ({})", line.key, line.value, line.origin));
            }
        }
        rendered
    }
}

/// Run `husky sources`.
pub fn execute(args: &SourcesArgs, config: &Config, json_mode: bool) -> Result<()> {
    let environment = load_environment(config)?;
    let result = SourcesOutput {
        sources: environment
            .sources()
            .iter()
            .map(|source| SourceSummary::from_source(source, args.properties))
            .collect(),
    };
    output(&result, json_mode);
    Ok(())
}
