//! Standard versus itemized deduction selection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::max;
use crate::models::{PolicyError, PolicyParameters, TaxpayerInput};

/// The deduction actually taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveDeduction {
    pub amount: Decimal,
    pub itemized: bool,
}

/// Number of age-65 and blindness boxes that raise the standard deduction.
fn additional_deduction_count(input: &TaxpayerInput) -> u32 {
    let own = [input.is_65_or_older, input.is_blind];
    let spouse = [input.spouse_is_65_or_older, input.spouse_is_blind];

    let mut count = own.iter().filter(|&&flag| flag).count();
    if input.filing_status.includes_spouse_deduction_flags() {
        count += spouse.iter().filter(|&&flag| flag).count();
    }
    count as u32
}

/// Base amount for the filing status plus one additional amount per
/// age-65 or blindness box checked.
pub fn standard_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Result<Decimal, PolicyError> {
    let status = input.filing_status;
    let base = params.standard_deduction_for(status)?;
    let additional = params.additional_deduction_for(status)?;
    Ok(base + additional * Decimal::from(additional_deduction_count(input)))
}

/// Schedule A total. No AGI floor on medical expenses and no cap on state
/// and local taxes are applied.
pub fn itemized_deduction(input: &TaxpayerInput) -> Decimal {
    input.medical_dental_expenses
        + input.state_local_taxes
        + input.interest_paid
        + input.charitable_cash_contributions
        + input.charitable_non_cash_contributions
}

/// Itemized when forced; the larger of the two when the taxpayer asks for
/// it; the standard deduction otherwise.
pub fn effective_deduction(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Result<EffectiveDeduction, PolicyError> {
    let standard = standard_deduction(input, params)?;
    let itemized = itemized_deduction(input);

    let choice = if input.force_itemized_deduction {
        EffectiveDeduction {
            amount: itemized,
            itemized: true,
        }
    } else if input.prefer_larger_deduction && itemized > standard {
        EffectiveDeduction {
            amount: itemized,
            itemized: true,
        }
    } else {
        EffectiveDeduction {
            amount: standard,
            itemized: false,
        }
    };

    Ok(EffectiveDeduction {
        amount: max(choice.amount, Decimal::ZERO),
        ..choice
    })
}
