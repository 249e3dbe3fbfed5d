//! Text-to-field coercion for the flat taxpayer input record.
//!
//! Input arrives as raw text (CSV cells, `key=value` pairs, form fields).
//! Bad numeric text is a data-entry problem, not a fault: it is logged and
//! coerced to zero. Only structural problems (unknown field, unknown filing
//! status) are reported as [`FieldError`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::warn;

use super::FilingStatus;

/// Errors raised while assigning a field by name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown taxpayer input field '{0}'")]
    UnknownField(String),

    #[error("unrecognised filing status '{0}'")]
    InvalidFilingStatus(String),
}

/// A mutable reference to one field of the input record, tagged with the
/// coercion rule that applies to it.
pub(crate) enum FieldSlot<'a> {
    /// Non-negative money.
    Amount(&'a mut Decimal),
    /// Money that may be negative (gains, business results).
    SignedAmount(&'a mut Decimal),
    /// Non-negative money where blank means "not provided".
    OptionalAmount(&'a mut Option<Decimal>),
    Count(&'a mut u32),
    Flag(&'a mut bool),
    Status(&'a mut FilingStatus),
}

impl FieldSlot<'_> {
    pub(crate) fn assign(
        self,
        key: &str,
        raw: &str,
    ) -> Result<(), FieldError> {
        match self {
            FieldSlot::Amount(target) => *target = coerce_amount(key, raw),
            FieldSlot::SignedAmount(target) => *target = coerce_signed_amount(key, raw),
            FieldSlot::OptionalAmount(target) => {
                *target = if normalize_decimal_input(raw).is_empty() {
                    None
                } else {
                    Some(coerce_amount(key, raw))
                };
            }
            FieldSlot::Count(target) => *target = coerce_count(key, raw),
            FieldSlot::Flag(target) => *target = coerce_flag(key, raw),
            FieldSlot::Status(target) => {
                *target = FilingStatus::parse(raw)
                    .ok_or_else(|| FieldError::InvalidFilingStatus(raw.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Largest magnitude accepted for a single amount. Anything beyond it is
/// treated as a data-entry error so that later sums cannot overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Trims whitespace and strips `$` and thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '$'], "")
}

/// Parses money text. Empty input is zero; unparseable input is `None`.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Some(Decimal::ZERO);
    }
    normalized.parse().ok()
}

fn coerce_signed_amount(
    key: &str,
    raw: &str,
) -> Decimal {
    match parse_decimal(raw) {
        Some(value) if value.abs() <= MAX_AMOUNT => value,
        Some(_) => {
            warn!(field = key, input = raw, "amount out of range; using 0");
            Decimal::ZERO
        }
        None => {
            warn!(field = key, input = raw, "invalid amount; using 0");
            Decimal::ZERO
        }
    }
}

fn coerce_amount(
    key: &str,
    raw: &str,
) -> Decimal {
    let value = coerce_signed_amount(key, raw);
    if value < Decimal::ZERO {
        warn!(field = key, input = raw, "negative amount not allowed; using 0");
        return Decimal::ZERO;
    }
    value
}

fn coerce_count(
    key: &str,
    raw: &str,
) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse().unwrap_or_else(|_| {
        warn!(field = key, input = raw, "invalid count; using 0");
        0
    })
}

fn coerce_flag(
    key: &str,
    raw: &str,
) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "x" => true,
        "false" | "no" | "n" | "0" | "" => false,
        _ => {
            warn!(field = key, input = raw, "invalid flag; using false");
            false
        }
    }
}
