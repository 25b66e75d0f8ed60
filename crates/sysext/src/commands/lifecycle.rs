//! Activate, forceActivate and deactivate commands

use crate::output;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::sync::Arc;
use sysext_core::{HierarchicalConfigLoader, Operation, Outcome, SysextConfig};
use sysext_lifecycle::{
    EventEnvelope, LifecycleObserver, LifecycleOrchestrator, LocalExtensionService,
    TracingObserver,
};

/// Resolved arguments for one lifecycle command
#[derive(Debug)]
pub struct LifecycleArgs {
    pub operation: Operation,
    pub config: Option<Utf8PathBuf>,
    pub identifier: Option<String>,
    pub bundle_version: Option<String>,
    pub json: bool,
}

/// Writes each envelope to stdout as one JSON line
struct JsonLinesObserver;

impl LifecycleObserver for JsonLinesObserver {
    fn on_event(&self, envelope: &EventEnvelope) {
        match serde_json::to_string(envelope) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize lifecycle event: {}", e),
        }
    }
}

pub async fn run(args: LifecycleArgs) -> Result<()> {
    let loader = HierarchicalConfigLoader::new().context("Failed to locate config directory")?;
    run_with_loader(args, &loader).await
}

async fn run_with_loader(args: LifecycleArgs, loader: &HierarchicalConfigLoader) -> Result<()> {
    let config = load_config(&args, loader)?;
    tracing::debug!(
        "Extension {} (bundle version {})",
        config.extension.identifier,
        config.extension.bundle_version
    );

    let service = LocalExtensionService::from_config(&config)?;
    let mut orchestrator = LifecycleOrchestrator::from_config(Arc::new(service), &config);
    if args.json {
        let observers: Vec<Arc<dyn LifecycleObserver>> =
            vec![Arc::new(TracingObserver), Arc::new(JsonLinesObserver)];
        orchestrator = orchestrator.with_observer(Arc::new(observers));
    }

    let identifier = orchestrator.identifier().to_string();
    let outcome = orchestrator.perform(args.operation).await?;

    if !args.json {
        report(args.operation, &identifier, outcome);
    }
    Ok(())
}

fn load_config(args: &LifecycleArgs, loader: &HierarchicalConfigLoader) -> Result<SysextConfig> {
    let mut config = loader
        .load(args.config.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Command-line flags win over files and environment
fn apply_overrides(config: &mut SysextConfig, args: &LifecycleArgs) {
    if let Some(identifier) = &args.identifier {
        config.extension.identifier = identifier.clone();
    }
    if let Some(version) = &args.bundle_version {
        config.extension.bundle_version = version.clone();
    }
}

fn report(operation: Operation, identifier: &str, outcome: Outcome) {
    let message = format!("{} of {} completed", operation.request_kind(), identifier);
    match outcome {
        Outcome::Completed => output::success(&message),
        Outcome::RequiresReboot => {
            output::info(&message);
            output::warning("A reboot is required to finish the request");
        }
    }
}
