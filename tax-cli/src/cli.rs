use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Form 1040 tax estimator.
///
/// Computes one return per taxpayer row against the built-in 2024 policy
/// table, optionally adjusted by policy and bracket files.
#[derive(Debug, Parser)]
#[command(name = "tax-estimate", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level or filter directive. `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute returns and print a report.
    Compute(ComputeArgs),
    /// Print the effective policy table.
    Policy(PolicyArgs),
}

/// Where the policy table comes from. Sources are applied in this order:
/// full table, override files, bracket schedules.
#[derive(Debug, Args)]
pub struct PolicySource {
    /// Complete policy table (TOML) replacing the built-in defaults.
    #[arg(long)]
    pub policy_table: Option<PathBuf>,

    /// Partial policy overrides (TOML). May be repeated; later files win.
    #[arg(long = "policy")]
    pub policies: Vec<PathBuf>,

    /// Bracket schedules in IRS form (CSV with X, Y-1, Y-2, Z schedules).
    #[arg(long)]
    pub brackets: Option<PathBuf>,

    /// Tax year to take from `--brackets` when it holds several.
    #[arg(long, requires = "brackets")]
    pub tax_year: Option<i32>,
}

#[derive(Debug, Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub policy: PolicySource,

    /// Taxpayer rows (CSV, one return per row, headers are field names).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Set a field on every return, e.g. `--set wages=60000`. May be repeated.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(flatten)]
    pub policy: PolicySource,

    #[arg(long, value_enum, default_value_t = PolicyFormat::Toml)]
    pub format: PolicyFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Whole-dollar text report.
    Table,
    /// Exact values as JSON.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyFormat {
    Toml,
    Json,
}

/// Splits `field=value`. The value may be empty or contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
