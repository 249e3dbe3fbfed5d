//! Adjustments to income (Schedule 1, Part II), including self-employment tax.
//!
//! # Self-employment tax
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | SE income: business + spouse business + farm, floored at 0 |
//! | 2    | Taxable SE income: step 1 × 92.35% |
//! | 3    | At or below the minimum net earnings (default 0), no SE tax |
//! | 4    | Up to the wage base: step 2 × 15.3% |
//! | 5    | Above the wage base: wage base × 12.4% + step 2 × 2.9% |
//! | 6    | Deduction: half of the SE tax, rounded to whole dollars |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::SelfEmploymentTax;
//! use tax_core::{FilingStatus, PolicyParameters, TaxpayerInput};
//!
//! let input = TaxpayerInput {
//!     filing_status: FilingStatus::MarriedFilingJointly,
//!     business_income: dec!(100000),
//!     ..Default::default()
//! };
//!
//! let se = SelfEmploymentTax::calculate(&input, &PolicyParameters::default());
//!
//! assert_eq!(se.taxable_income, dec!(92350));
//! assert_eq!(se.tax, dec!(14129.55));
//! assert_eq!(se.deduction, dec!(7065));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::common::{min, non_negative, round_whole_dollars};
use crate::models::{FilingStatus, PolicyParameters, TaxpayerInput};

/// Self-employment tax figures for one return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentTax {
    /// Combined SE income, floored at zero.
    pub income: Decimal,
    /// SE income subject to SE tax.
    pub taxable_income: Decimal,
    pub tax: Decimal,
    /// Deductible half of the tax, in whole dollars.
    pub deduction: Decimal,
    /// Set when taxable SE income did not exceed the minimum net earnings.
    pub below_threshold: bool,
}

impl SelfEmploymentTax {
    pub fn calculate(
        input: &TaxpayerInput,
        params: &PolicyParameters,
    ) -> Self {
        let se = &params.self_employment;
        let income = self_employment_income(input);
        let taxable_income = income * se.taxable_percentage;

        if taxable_income <= se.minimum_net_earnings {
            if taxable_income > Decimal::ZERO {
                debug!(%taxable_income, "taxable SE income at or below minimum; no SE tax");
            }
            return Self {
                income,
                taxable_income,
                below_threshold: true,
                ..Self::default()
            };
        }

        let tax = if taxable_income <= se.wage_base_limit {
            taxable_income * se.full_rate
        } else {
            se.wage_base_limit * se.social_security_rate + taxable_income * se.medicare_rate
        };

        Self {
            income,
            taxable_income,
            tax,
            deduction: round_whole_dollars(tax / Decimal::TWO),
            below_threshold: false,
        }
    }
}

/// Business, spouse business and farm income, floored at zero.
pub fn self_employment_income(input: &TaxpayerInput) -> Decimal {
    let combined = input.business_income + input.spouse_business_income + input.farm_income;
    non_negative("self_employment_income", combined)
}

pub fn self_employment_tax(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    SelfEmploymentTax::calculate(input, params).tax
}

pub fn self_employment_tax_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    SelfEmploymentTax::calculate(input, params).deduction
}

/// Educator expenses up to the per-educator limit. A joint return counts
/// two educators.
pub fn educator_expense_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    let educators = match input.filing_status {
        FilingStatus::MarriedFilingJointly => Decimal::TWO,
        _ => Decimal::ONE,
    };
    let cap = params.educator_expense_limit * educators;
    if input.educator_expenses > cap {
        warn!(
            claimed = %input.educator_expenses,
            %cap,
            "educator expenses exceed limit; capping"
        );
    }
    min(input.educator_expenses, cap)
}

pub fn student_loan_interest_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    let cap = params.student_loan_interest_limit;
    if input.student_loan_interest > cap {
        warn!(
            claimed = %input.student_loan_interest,
            %cap,
            "student loan interest exceeds limit; capping"
        );
    }
    min(input.student_loan_interest, cap)
}

/// Sum of every above-the-line adjustment, given an already computed SE
/// tax deduction.
pub(crate) fn adjustments_with_se_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
    se_tax_deduction: Decimal,
) -> Decimal {
    input.employee_business_expenses
        + input.hsa_deduction
        + input.sep_simple_contributions
        + input.self_employed_health_insurance
        + input.early_withdrawal_penalty
        + input.alimony_paid
        + input.ira_deduction
        + se_tax_deduction
        + educator_expense_deduction(input, params)
        + student_loan_interest_deduction(input, params)
}

pub fn total_adjustments(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    adjustments_with_se_deduction(input, params, self_employment_tax_deduction(input, params))
}
