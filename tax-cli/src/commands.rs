//! Subcommand bodies. Each returns the text to print so the binary stays a
//! thin shell.

use std::fs::File;

use anyhow::{Context, Result, bail};
use tax_core::{PolicyStore, TaxpayerInput};
use tax_data::{BracketScheduleLoader, policy_file, taxpayer_loader};
use tracing::{debug, info};

use crate::cli::{ComputeArgs, PolicyArgs, PolicyFormat, PolicySource, ReportFormat};
use crate::report;

/// Builds the policy store from the built-in defaults plus every source
/// named on the command line.
pub fn build_store(source: &PolicySource) -> Result<PolicyStore> {
    let mut store = PolicyStore::default();

    if let Some(path) = &source.policy_table {
        let params = policy_file::load_parameters(path)
            .with_context(|| format!("Failed to load policy table: {}", path.display()))?;
        store
            .replace(params)
            .with_context(|| format!("Rejected policy table: {}", path.display()))?;
    }

    for path in &source.policies {
        let overrides = policy_file::load_overrides(path)
            .with_context(|| format!("Failed to load policy overrides: {}", path.display()))?;
        store
            .apply(&overrides)
            .with_context(|| format!("Rejected policy overrides: {}", path.display()))?;
    }

    if let Some(path) = &source.brackets {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = BracketScheduleLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let overrides = BracketScheduleLoader::into_overrides(&records, source.tax_year)
            .with_context(|| format!("Failed to build schedules from: {}", path.display()))?;
        store
            .apply(&overrides)
            .with_context(|| format!("Rejected bracket schedules: {}", path.display()))?;
    }

    info!(
        tax_year = store.current().tax_year,
        revision = store.revision(),
        "policy table ready"
    );
    Ok(store)
}

/// Reads the taxpayer rows, or a single default return when no file is
/// given, then applies every `--set` assignment to each row.
pub fn load_inputs(args: &ComputeArgs) -> Result<Vec<TaxpayerInput>> {
    let mut inputs = match &args.input {
        Some(path) => {
            let rows = taxpayer_loader::load_from_file(path)
                .with_context(|| format!("Failed to load taxpayers: {}", path.display()))?;
            if rows.is_empty() {
                bail!("{} contains no taxpayer rows", path.display());
            }
            rows
        }
        None => vec![TaxpayerInput::default()],
    };

    for input in &mut inputs {
        for (key, value) in &args.assignments {
            input
                .set_field(key, value)
                .with_context(|| format!("Invalid --set {key}={value}"))?;
        }
    }

    debug!(returns = inputs.len(), "inputs prepared");
    Ok(inputs)
}

pub fn run_compute(args: &ComputeArgs) -> Result<String> {
    let store = build_store(&args.policy)?;
    let inputs = load_inputs(args)?;

    let results = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            store
                .compute(input)
                .with_context(|| format!("Failed to compute return {}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        ReportFormat::Table => Ok(report::render_table(&results)),
        ReportFormat::Json => report::render_json(&results).context("Failed to serialize results"),
    }
}

pub fn run_policy(args: &PolicyArgs) -> Result<String> {
    let store = build_store(&args.policy)?;
    let params = store.current();

    match args.format {
        PolicyFormat::Toml => policy_file::to_toml(params).context("Failed to write policy table"),
        PolicyFormat::Json => {
            serde_json::to_string_pretty(params).context("Failed to write policy table")
        }
    }
}
