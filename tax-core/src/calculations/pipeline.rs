use rust_decimal::Decimal;
use tracing::debug;

use super::adjustments::{SelfEmploymentTax, adjustments_with_se_deduction};
use super::brackets::{bracket_tax, marginal_rate};
use super::common::{max, min, non_negative};
use super::credits::{
    additional_child_tax_credit, child_tax_credit, earned_income_credit, education_credits,
    retirement_savings_credit,
};
use super::deductions::{effective_deduction, itemized_deduction, standard_deduction};
use super::income::{taxable_social_security, total_other_income, total_wages};
use crate::models::{
    ComputationResult, CreditBreakdown, PolicyError, PolicyParameters, TaxpayerInput,
};

/// Runs the whole return for `input` under `params`.
///
/// The computation is pure: the same input and policy always produce the
/// same result.
///
/// # Errors
///
/// Returns [`PolicyError`] when `params` lacks an entry the input needs,
/// such as a bracket schedule or phase-out threshold for its filing status,
/// or holds a value that would make a phase-out undefined. Tables that
/// passed [`PolicyParameters::validate`] (every table held by a
/// [`PolicyStore`](crate::PolicyStore)) never hit the latter.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::compute;
/// use tax_core::{PolicyParameters, TaxpayerInput};
///
/// let input = TaxpayerInput {
///     wages: dec!(60000),
///     ..Default::default()
/// };
///
/// let result = compute(&input, &PolicyParameters::default()).unwrap();
///
/// assert_eq!(result.taxable_income, dec!(45400));
/// assert_eq!(result.bracket_tax, dec!(5216));
/// ```
pub fn compute(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Result<ComputationResult, PolicyError> {
    let status = input.filing_status;

    // Income
    let total_wages = total_wages(input);
    let total_other_income = total_other_income(input);
    let taxable_social_security_benefits = taxable_social_security(input, params);
    let total_income = total_wages + total_other_income + taxable_social_security_benefits;
    debug!(%total_wages, %total_other_income, %total_income, "income aggregated");

    // Adjustments
    let se = SelfEmploymentTax::calculate(input, params);
    let total_adjustments = adjustments_with_se_deduction(input, params, se.deduction);
    let agi = total_income - total_adjustments;
    debug!(se_tax = %se.tax, %total_adjustments, %agi, "adjustments applied");

    // Deductions
    let standard_deduction = standard_deduction(input, params)?;
    let itemized_deduction = itemized_deduction(input);
    let deduction = effective_deduction(input, params)?;
    let taxable_income = non_negative("taxable_income", agi - deduction.amount);

    // Bracket tax
    let schedule = params.brackets_for(status)?;
    let bracket_tax = bracket_tax(taxable_income, schedule);
    let marginal_rate = marginal_rate(taxable_income, schedule);
    debug!(%taxable_income, %bracket_tax, %marginal_rate, "bracket tax computed");

    // Credits
    let ctc = child_tax_credit(input, agi, params)?;
    let education = education_credits(input, agi, params)?;
    let retirement_savings = retirement_savings_credit(input, agi, params)?;
    let earned_income_credit = earned_income_credit(input, agi, params)?;

    let other_nonrefundable: Decimal = [
        input.foreign_tax_credit,
        input.child_dependent_care_credit,
        education.lifetime_learning,
        education.american_opportunity_nonrefundable,
        retirement_savings,
        input.energy_efficient_home_credit,
        input.other_nonrefundable_credits,
    ]
    .into_iter()
    .map(|credit| max(credit, Decimal::ZERO))
    .sum();

    let additional_ctc =
        additional_child_tax_credit(input, ctc, bracket_tax - other_nonrefundable, params);
    let total_nonrefundable_credits = other_nonrefundable + ctc;
    let tax_after_credits = max(bracket_tax - total_nonrefundable_credits, Decimal::ZERO);

    // Other taxes
    let total_additional_taxes = se.tax
        + input.unreported_social_security_tax
        + input.additional_tax_on_iras
        + input.household_employment_taxes
        + input.first_time_homebuyer_repayment;
    let total_tax = tax_after_credits + total_additional_taxes;

    // Payments
    let total_payments_and_refundable_credits = input.federal_income_tax_withheld
        + input.estimated_tax_payments
        + min(input.excess_social_security, params.excess_social_security_limit)
        + input.other_payments
        + input.net_premium_tax_credit
        + input.other_refundable_credits
        + additional_ctc
        + education.american_opportunity_refundable
        + earned_income_credit;

    let final_balance = total_payments_and_refundable_credits - total_tax;
    let effective_rate = if total_income > Decimal::ZERO {
        total_tax / total_income
    } else {
        Decimal::ZERO
    };
    debug!(%total_tax, %final_balance, "return computed");

    Ok(ComputationResult {
        tax_year: params.tax_year,
        filing_status: status,
        total_wages,
        total_other_income,
        taxable_social_security_benefits,
        total_income,
        self_employment_income: se.income,
        self_employment_tax: se.tax,
        self_employment_tax_deduction: se.deduction,
        total_adjustments,
        agi,
        standard_deduction,
        itemized_deduction,
        effective_deduction: deduction.amount,
        used_itemized_deduction: deduction.itemized,
        taxable_income,
        bracket_tax,
        marginal_rate,
        credits: CreditBreakdown {
            child_tax_credit: ctc,
            additional_child_tax_credit: additional_ctc,
            earned_income_credit,
            american_opportunity_nonrefundable: education.american_opportunity_nonrefundable,
            american_opportunity_refundable: education.american_opportunity_refundable,
            lifetime_learning: education.lifetime_learning,
            retirement_savings,
        },
        total_nonrefundable_credits,
        tax_after_credits,
        total_additional_taxes,
        total_tax,
        total_payments_and_refundable_credits,
        final_balance,
        effective_rate,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatus;

    #[test]
    fn zeroed_input_owes_nothing() {
        let params = PolicyParameters::default();

        let result = compute(&TaxpayerInput::default(), &params).unwrap();

        assert_eq!(result.total_income, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.final_balance, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
        assert_eq!(result.standard_deduction, dec!(14600));
    }

    #[test]
    fn withholding_above_tax_is_a_refund() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            wages: dec!(60000),
            federal_income_tax_withheld: dec!(6000),
            ..Default::default()
        };

        let result = compute(&input, &params).unwrap();

        assert_eq!(result.total_tax, dec!(5216));
        assert_eq!(result.final_balance, dec!(784));
        assert!(result.is_refund());
    }

    #[test]
    fn nonrefundable_credits_cannot_push_tax_below_zero() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            wages: dec!(20000),
            foreign_tax_credit: dec!(5000),
            ..Default::default()
        };

        let result = compute(&input, &params).unwrap();

        // 5,400 taxable at 10%
        assert_eq!(result.bracket_tax, dec!(540));
        assert_eq!(result.total_nonrefundable_credits, dec!(5000));
        assert_eq!(result.tax_after_credits, dec!(0));
    }

    #[test]
    fn unabsorbed_child_credit_becomes_refundable() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::HeadOfHousehold,
            wages: dec!(30000),
            child_tax_credit_dependents: 2,
            ..Default::default()
        };

        let result = compute(&input, &params).unwrap();

        // 8,100 taxable at 10%
        assert_eq!(result.bracket_tax, dec!(810));
        assert_eq!(result.credits.child_tax_credit, dec!(4000));
        assert_eq!(result.credits.additional_child_tax_credit, dec!(3190));
        assert_eq!(result.tax_after_credits, dec!(0));
        assert_eq!(result.final_balance, dec!(3190));
    }

    #[test]
    fn excess_social_security_is_capped() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            excess_social_security: dec!(12000),
            ..Default::default()
        };

        let result = compute(&input, &params).unwrap();

        assert_eq!(result.total_payments_and_refundable_credits, dec!(9870.60));
    }

    #[test]
    fn additional_taxes_include_se_tax() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            business_income: dec!(10000),
            household_employment_taxes: dec!(500),
            ..Default::default()
        };

        let result = compute(&input, &params).unwrap();

        // 9,235 × 15.3%
        assert_eq!(result.self_employment_tax, dec!(1412.955));
        assert_eq!(result.total_additional_taxes, dec!(1912.955));
    }

    #[test]
    fn unvalidated_zero_phase_out_step_is_an_error() {
        let mut params = PolicyParameters::default();
        params.child_tax_credit.phase_out_step = dec!(0);
        let input = TaxpayerInput {
            wages: dec!(300000),
            child_tax_credit_dependents: 1,
            ..Default::default()
        };

        let result = compute(&input, &params);

        assert_eq!(
            result,
            Err(PolicyError::NotPositive {
                field: "child_tax_credit.phase_out_step",
                value: dec!(0),
            })
        );
    }

    #[test]
    fn missing_schedule_fails_computation() {
        let mut params = PolicyParameters::default();
        params.brackets.remove(&FilingStatus::QualifyingWidow);
        let input = TaxpayerInput {
            filing_status: FilingStatus::QualifyingWidow,
            ..Default::default()
        };

        let result = compute(&input, &params);

        assert_eq!(
            result,
            Err(PolicyError::MissingEntry {
                table: "brackets",
                status: FilingStatus::QualifyingWidow,
            })
        );
    }
}
