//! TOML policy files.
//!
//! An override file names only what it changes:
//!
//! ```toml
//! tax_year = 2025
//!
//! [standard_deduction]
//! S = "15000"
//! MFJ = "30000"
//!
//! [child_tax_credit]
//! max_per_child = "2200"
//!
//! [self_employment]
//! wage_base_limit = "176100"
//! ```
//!
//! Filing statuses may be written as codes (`MFJ`) or names
//! (`MarriedFilingJointly`). Amounts may be quoted or bare integers; quote
//! fractional values so they are read exactly.

use std::fs;
use std::path::{Path, PathBuf};

use tax_core::{PolicyOverrides, PolicyParameters};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid policy file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write policy table: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn read(path: &Path) -> Result<String, PolicyFileError> {
    fs::read_to_string(path).map_err(|source| PolicyFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a partial override file. Unknown keys are rejected.
pub fn parse_overrides(text: &str) -> Result<PolicyOverrides, PolicyFileError> {
    Ok(toml::from_str(text)?)
}

pub fn load_overrides(path: &Path) -> Result<PolicyOverrides, PolicyFileError> {
    parse_overrides(&read(path)?)
}

/// Parses a complete policy table, as written by [`to_toml`].
pub fn parse_parameters(text: &str) -> Result<PolicyParameters, PolicyFileError> {
    Ok(toml::from_str(text)?)
}

pub fn load_parameters(path: &Path) -> Result<PolicyParameters, PolicyFileError> {
    parse_parameters(&read(path)?)
}

pub fn to_toml(params: &PolicyParameters) -> Result<String, PolicyFileError> {
    Ok(toml::to_string_pretty(params)?)
}
