//! telebind - apply a batch of telemetry values to a pipeline model
//!
//! Usage: `telebind <model.json> <bindings.json> [config.toml]`
//!
//! `bindings.json` is an array of `[identifier, value]` pairs, applied in order.

use anyhow::{bail, Context};
use std::sync::Arc;
use telebind_rs::{
    config::TelemetryConfig,
    model::{Configuration, ModelDocument, RawValue},
    TelemetryService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,telebind_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (model_path, bindings_path, config_path) = match args.as_slice() {
        [model, bindings] => (model, bindings, None),
        [model, bindings, config] => (model, bindings, Some(config)),
        _ => bail!("usage: telebind <model.json> <bindings.json> [config.toml]"),
    };

    let config = match config_path {
        Some(path) => TelemetryConfig::load(path)
            .with_context(|| format!("loading config {}", path))?,
        None => TelemetryConfig::load_or_default(),
    };

    let (model, provider) = ModelDocument::load(model_path)
        .with_context(|| format!("loading model {}", model_path))?
        .into_model()
        .with_context(|| format!("resolving model {}", model_path))?;
    tracing::info!(
        "Loaded {} nodes and {} runtime mappings from {}",
        model.len(),
        provider.len(),
        model_path
    );

    let bindings: Vec<(String, RawValue)> = serde_json::from_str(
        &std::fs::read_to_string(bindings_path)
            .with_context(|| format!("reading bindings {}", bindings_path))?,
    )
    .with_context(|| format!("parsing bindings {}", bindings_path))?;

    let configuration = Configuration::new(model);
    let service = TelemetryService::new(&config, Arc::new(provider));
    let report = service.store_value_binding(&configuration, bindings);

    let model = configuration.read();
    for bound in &report.applied {
        let element = model.get(bound.node).map(|n| n.decl_name.as_str()).unwrap_or("?");
        println!("{:<60} -> {}.{} = {}", bound.identifier, element, bound.slot, bound.value);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }
    tracing::info!(
        "{} applied, {} failed",
        report.applied.len(),
        report.errors.len()
    );
    Ok(())
}
