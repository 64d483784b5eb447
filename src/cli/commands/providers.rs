//! Implementation of the `husky providers` command.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::plugins::names::{NameService, NAME_SERVICE};
use crate::adapters::plugins::BUILTIN_CAPABILITIES;
use crate::cli::commands::build_registry;
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::errors::InstantiationFailure;
use crate::domain::models::{Config, DiscoveryPolicy};
use crate::domain::ports::Capability;
use crate::services::{CapabilityRegistry, DiscoveryReport};

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Capability name, e.g. NameService
    pub capability: String,

    /// Fail on the first entry that cannot be instantiated
    #[arg(long)]
    pub strict: bool,
}

/// A discovered provider.
#[derive(Debug, Serialize)]
pub struct ProviderLine {
    /// Implementation identity from the manifest.
    pub implementation: String,
    /// Manifest file and line.
    pub origin: String,
    /// What the instance reports about itself.
    pub description: String,
}

/// A manifest entry that produced no provider.
#[derive(Debug, Serialize)]
pub struct FailureLine {
    /// Implementation identity as written.
    pub implementation: String,
    /// Manifest file and line.
    pub origin: String,
    /// Why it failed.
    pub error: String,
}

/// Output of `husky providers`.
#[derive(Debug, Serialize)]
pub struct ProvidersOutput {
    /// Capability contract name.
    pub capability: String,
    /// Providers in discovery order.
    pub providers: Vec<ProviderLine>,
    /// Failed entries in discovery order.
    pub failures: Vec<FailureLine>,
}

impl CommandOutput for ProvidersOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["implementation", "description", "origin"]);
        for provider in &self.providers {
            table.add_row(vec![
                provider.implementation.clone(),
                provider.description.clone(),
                provider.origin.clone(),
            ]);
        }
        let mut rendered = render_list("provider", &table, self.providers.len());

        if !self.failures.is_empty() {
            let mut failures = list_table(&["implementation", "error", "origin"]);
            for failure in &self.failures {
                failures.add_row(vec![
                    failure.implementation.clone(),
                    failure.error.clone(),
                    failure.origin.clone(),
                ]);
            }
            rendered.push_str("\n\n");
            rendered.push_str(&render_list("failure", &failures, self.failures.len()));
        }
        rendered
    }
}

impl From<&InstantiationFailure> for FailureLine {
    fn from(failure: &InstantiationFailure) -> Self {
        Self {
            implementation: failure.implementation.clone(),
            origin: failure.origin.to_string(),
            error: failure.cause.to_string(),
        }
    }
}

/// Discover `C` within the registry's timeout and describe each provider.
pub async fn discover_report<C>(
    registry: &Arc<CapabilityRegistry>,
    strict: bool,
    describe: fn(&C) -> String,
) -> Result<ProvidersOutput>
where
    C: Capability + ?Sized,
{
    let timeout = registry.default_timeout();
    let report: DiscoveryReport<C> = if strict {
        let providers = registry
            .discover_within::<C, _, _>(timeout, |discovery| {
                discovery.with_policy(DiscoveryPolicy::Strict)
            })
            .await??;
        DiscoveryReport {
            providers,
            failures: Vec::new(),
        }
    } else {
        registry
            .discover_within::<C, _, _>(timeout, |discovery| discovery.report())
            .await?
    };

    Ok(ProvidersOutput {
        capability: C::NAME.to_string(),
        providers: report
            .providers
            .iter()
            .map(|provider| ProviderLine {
                implementation: provider.implementation().to_string(),
                origin: provider.origin().to_string(),
                description: describe(provider.instance()),
            })
            .collect(),
        failures: report.failures.iter().map(FailureLine::from).collect(),
    })
}

/// Run `husky providers`.
pub async fn execute(args: &ProvidersArgs, config: &Config, json_mode: bool) -> Result<()> {
    let registry = build_registry(config)?;
    let strict = args.strict || config.discovery.policy == DiscoveryPolicy::Strict;

    let result = match args.capability.as_str() {
        NAME_SERVICE => {
            discover_report::<dyn NameService>(&registry, strict, |service| service.name()).await?
        }
        unknown => bail!(
            "Unknown capability: '{unknown}'. Available capabilities: {}",
            BUILTIN_CAPABILITIES.join(", ")
        ),
    };

    output(&result, json_mode);
    Ok(())
}
