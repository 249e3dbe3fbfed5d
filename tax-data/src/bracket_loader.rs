use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::common::round_half_up;
use tax_core::{ByStatus, FilingStatus, PolicyOverrides, TaxBracket};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("File contains no brackets")]
    Empty,

    #[error("No brackets found for tax year {0}")]
    NoBracketsForYear(i32),

    #[error("File holds several tax years ({0:?}); choose one")]
    MultipleTaxYears(Vec<i32>),

    #[error("Schedule {schedule}: bracket ends at {expected} but the next one starts at {found}")]
    ScheduleGap {
        schedule: String,
        expected: Decimal,
        found: Decimal,
    },
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Widow(er)
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<&'static [FilingStatus], BracketLoaderError> {
    match schedule.trim() {
        "X" => Ok(&[FilingStatus::Single]),
        "Y-1" => Ok(&[
            FilingStatus::MarriedFilingJointly,
            FilingStatus::QualifyingWidow,
        ]),
        "Y-2" => Ok(&[FilingStatus::MarriedFilingSeparately]),
        "Z" => Ok(&[FilingStatus::HeadOfHousehold]),
        _ => Err(BracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// Columns:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: Lower boundary of the bracket
/// - `max_income`: Upper boundary (empty or absent for the top bracket)
/// - `base_tax`: Tax on `min_income` (optional, cross-checked when present)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub base_tax: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedules in IRS schedule form.
///
/// The loaded schedules become a [`PolicyOverrides`] that replaces the
/// bracket table for every filing status the file covers.
pub struct BracketScheduleLoader;

impl BracketScheduleLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Picks the tax year to load: `requested` when given, otherwise the
    /// only year present in `records`.
    pub fn select_year(
        records: &[BracketRecord],
        requested: Option<i32>,
    ) -> Result<i32, BracketLoaderError> {
        let years: BTreeSet<i32> = records.iter().map(|r| r.tax_year).collect();

        match requested {
            Some(year) if years.contains(&year) => Ok(year),
            Some(year) => Err(BracketLoaderError::NoBracketsForYear(year)),
            None if years.len() > 1 => {
                Err(BracketLoaderError::MultipleTaxYears(years.into_iter().collect()))
            }
            None => years.first().copied().ok_or(BracketLoaderError::Empty),
        }
    }

    /// Builds bracket schedules for `tax_year`, keyed by filing status.
    ///
    /// Records are grouped by schedule and sorted by `min_income`. Each
    /// bracket's `max_income`, when given, must equal the next bracket's
    /// `min_income`. A `base_tax` that disagrees with the tax accumulated
    /// by the lower brackets is logged and otherwise ignored.
    ///
    /// Schedule Y-1 fills both Married Filing Jointly and Qualifying
    /// Widow(er).
    pub fn schedules(
        records: &[BracketRecord],
        tax_year: i32,
    ) -> Result<ByStatus<Vec<TaxBracket>>, BracketLoaderError> {
        let mut groups: BTreeMap<&str, Vec<&BracketRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            groups
                .entry(record.schedule.trim())
                .or_default()
                .push(record);
        }
        if groups.is_empty() {
            return Err(BracketLoaderError::NoBracketsForYear(tax_year));
        }

        let mut schedules = ByStatus::new();
        for (schedule, mut group) in groups {
            let statuses = schedule_to_filing_statuses(schedule)?;
            group.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            check_continuity(schedule, &group)?;

            let brackets: Vec<TaxBracket> = group
                .iter()
                .map(|record| TaxBracket::new(record.rate, record.min_income))
                .collect();
            debug!(schedule, tax_year, count = brackets.len(), "loaded bracket schedule");

            for status in statuses {
                schedules.insert(*status, brackets.clone());
            }
        }

        Ok(schedules)
    }

    /// Selects a year and turns its schedules into a bracket-only overlay.
    pub fn into_overrides(
        records: &[BracketRecord],
        requested_year: Option<i32>,
    ) -> Result<PolicyOverrides, BracketLoaderError> {
        let tax_year = Self::select_year(records, requested_year)?;
        let brackets = Self::schedules(records, tax_year)?;

        Ok(PolicyOverrides {
            tax_year: Some(tax_year),
            brackets,
            ..Default::default()
        })
    }
}

fn check_continuity(
    schedule: &str,
    group: &[&BracketRecord],
) -> Result<(), BracketLoaderError> {
    let mut accumulated = Decimal::ZERO;

    for (index, record) in group.iter().enumerate() {
        if let Some(stated) = record.base_tax {
            if round_half_up(stated) != round_half_up(accumulated) {
                warn!(
                    schedule,
                    min_income = %record.min_income,
                    %stated,
                    computed = %accumulated,
                    "base tax disagrees with lower brackets"
                );
            }
        }

        let Some(next) = group.get(index + 1) else {
            break;
        };
        if let Some(max_income) = record.max_income {
            if max_income != next.min_income {
                return Err(BracketLoaderError::ScheduleGap {
                    schedule: schedule.to_string(),
                    expected: max_income,
                    found: next.min_income,
                });
            }
        }
        accumulated += (next.min_income - record.min_income) * record.rate;
    }
    Ok(())
}
