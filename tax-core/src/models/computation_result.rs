use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Credits computed by the engine, after phase-outs.
///
/// Credits entered directly by the taxpayer (foreign tax, child care,
/// energy, other) are not repeated here; they appear only in
/// [`ComputationResult::total_nonrefundable_credits`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBreakdown {
    /// Nonrefundable child tax credit and credit for other dependents.
    pub child_tax_credit: Decimal,
    /// Refundable part of the child tax credit.
    pub additional_child_tax_credit: Decimal,
    pub earned_income_credit: Decimal,
    pub american_opportunity_nonrefundable: Decimal,
    pub american_opportunity_refundable: Decimal,
    pub lifetime_learning: Decimal,
    pub retirement_savings: Decimal,
}

/// Every figure derived from one [`TaxpayerInput`](super::TaxpayerInput).
///
/// Values are exact; rounding to whole dollars is left to presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    // Income
    pub total_wages: Decimal,
    pub total_other_income: Decimal,
    pub taxable_social_security_benefits: Decimal,
    pub total_income: Decimal,

    // Adjustments
    pub self_employment_income: Decimal,
    pub self_employment_tax: Decimal,
    pub self_employment_tax_deduction: Decimal,
    pub total_adjustments: Decimal,
    pub agi: Decimal,

    // Deductions
    pub standard_deduction: Decimal,
    pub itemized_deduction: Decimal,
    pub effective_deduction: Decimal,
    pub used_itemized_deduction: bool,
    pub taxable_income: Decimal,

    // Tax and credits
    pub bracket_tax: Decimal,
    pub marginal_rate: Decimal,
    pub credits: CreditBreakdown,
    pub total_nonrefundable_credits: Decimal,
    pub tax_after_credits: Decimal,
    pub total_additional_taxes: Decimal,
    pub total_tax: Decimal,

    // Settlement
    pub total_payments_and_refundable_credits: Decimal,
    /// Positive is a refund, negative is an amount owed.
    pub final_balance: Decimal,
    /// `total_tax / total_income`, or 0 when there is no income.
    pub effective_rate: Decimal,
}

impl ComputationResult {
    pub fn is_refund(&self) -> bool {
        self.final_balance > Decimal::ZERO
    }

    pub fn amount_owed(&self) -> Decimal {
        if self.final_balance < Decimal::ZERO {
            -self.final_balance
        } else {
            Decimal::ZERO
        }
    }
}
