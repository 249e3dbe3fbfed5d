//! Progressive bracket tax.
//!
//! Each bracket taxes the slice of income between its threshold and the
//! next one; the top bracket is open-ended.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::bracket_tax;
//! use tax_core::{FilingStatus, PolicyParameters};
//!
//! let params = PolicyParameters::default();
//! let schedule = params.brackets_for(FilingStatus::Single).unwrap();
//!
//! // 11,600 × 10% + 33,800 × 12%
//! assert_eq!(bracket_tax(dec!(45400), schedule), dec!(5216));
//! ```

use rust_decimal::Decimal;

use super::common::{min, non_negative};
use crate::models::TaxBracket;

/// Tax on `taxable_income` under `schedule`. Negative income is taxed as
/// zero. An empty schedule yields zero; callers obtain schedules through
/// [`PolicyParameters::brackets_for`](crate::PolicyParameters::brackets_for),
/// which rejects empty ones.
pub fn bracket_tax(
    taxable_income: Decimal,
    schedule: &[TaxBracket],
) -> Decimal {
    let income = non_negative("taxable_income", taxable_income);

    let mut tax = Decimal::ZERO;
    for (index, bracket) in schedule.iter().enumerate() {
        if income <= bracket.threshold {
            break;
        }
        let top = match schedule.get(index + 1) {
            Some(next) => min(income, next.threshold),
            None => income,
        };
        tax += (top - bracket.threshold) * bracket.rate;
    }
    tax
}

/// Rate applied to the last dollar of `taxable_income`. Zero income sits in
/// the first bracket.
pub fn marginal_rate(
    taxable_income: Decimal,
    schedule: &[TaxBracket],
) -> Decimal {
    let income = taxable_income.max(Decimal::ZERO);
    schedule
        .iter()
        .take_while(|bracket| bracket.threshold < income || bracket.threshold.is_zero())
        .last()
        .map(|bracket| bracket.rate)
        .unwrap_or(Decimal::ZERO)
}
