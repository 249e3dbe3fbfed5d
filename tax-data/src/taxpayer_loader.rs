//! CSV loader for taxpayer input rows.
//!
//! ## CSV Format
//!
//! Each row is one return. Headers are [`TaxpayerInput`] field names
//! (`wages`, `filing_status`, `is_65_or_older`, ...). Column order does
//! **not** matter and any subset of fields may be present. Empty cells keep
//! the field's default.
//!
//! | Kind     | Accepted cell text                                      |
//! |----------|---------------------------------------------------------|
//! | amounts  | `60000`, `60,000.00`, `$60,000`                         |
//! | counts   | `0`, `2`                                                |
//! | flags    | `true`/`false`, `yes`/`no`, `y`/`n`, `1`/`0`, `x`       |
//! | status   | `S`, `MFJ`, `MFS`, `HOH`, `QW` or the full variant name |
//!
//! Unusable numeric text is coerced to zero with a warning. Unknown columns
//! and unrecognised filing statuses are errors.
//!
//! ### Example
//!
//! ```csv
//! filing_status,wages,business_income,child_tax_credit_dependents
//! S,60000,,
//! MFJ,85000,12000,2
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tax_core::{FieldError, TaxpayerInput};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading taxpayer rows.
#[derive(Debug, Error)]
pub enum TaxpayerLoadError {
    /// The underlying CSV reader failed (bad structure, ragged rows, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    /// `row` is 1-based (header = row 0).
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), TaxpayerLoadError> {
    let mut seen = HashSet::new();
    for header in headers {
        if !TaxpayerInput::FIELD_NAMES.contains(&header) {
            return Err(TaxpayerLoadError::UnknownColumn(header.to_string()));
        }
        if !seen.insert(header) {
            return Err(TaxpayerLoadError::DuplicateColumn(header.to_string()));
        }
    }
    Ok(())
}

fn convert_row(
    headers: &csv::StringRecord,
    row: &csv::StringRecord,
    row_number: usize,
) -> Result<TaxpayerInput, TaxpayerLoadError> {
    let mut input = TaxpayerInput::default();

    for (key, cell) in headers.iter().zip(row.iter()) {
        if cell.is_empty() {
            continue;
        }
        input.set_field(key, cell).map_err(|err| match err {
            FieldError::InvalidFilingStatus(status) => {
                TaxpayerLoadError::InvalidFilingStatus {
                    status,
                    row: row_number,
                }
            }
            FieldError::UnknownField(name) => TaxpayerLoadError::UnknownColumn(name),
        })?;
    }

    Ok(input)
}

/// Parse CSV text and return one [`TaxpayerInput`] per row, in file order.
///
/// # Errors
///
/// * [`TaxpayerLoadError::Parse`] if the CSV is structurally invalid.
/// * [`TaxpayerLoadError::UnknownColumn`] / [`TaxpayerLoadError::DuplicateColumn`]
///   for a bad header.
/// * [`TaxpayerLoadError::InvalidFilingStatus`] if a row names an unknown
///   filing status.
pub fn load_from_str(input: &str) -> Result<Vec<TaxpayerInput>, TaxpayerLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    check_headers(&headers)?;

    let rows = reader
        .records()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(&headers, &row, idx + 1)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = rows.len(), columns = headers.len(), "loaded taxpayer rows");
    Ok(rows)
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<TaxpayerInput>, TaxpayerLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TaxpayerLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
