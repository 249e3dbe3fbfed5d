//! Credits and their AGI phase-outs.
//!
//! | Credit                     | Kind            | Phase-out                                   |
//! |----------------------------|-----------------|---------------------------------------------|
//! | Child tax credit           | nonrefundable   | $50 per started $1,000 of AGI over threshold |
//! | Additional child tax credit| refundable      | unabsorbed CTC, capped per child            |
//! | Earned income credit       | refundable      | cliff at the table's maximum AGI            |
//! | American Opportunity       | split           | linear between start and end                |
//! | Lifetime Learning          | nonrefundable   | linear between start and end                |
//! | Retirement savings         | nonrefundable   | cliff at the income limit                   |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::common::{max, min, round_half_up};
use crate::models::{FilingStatus, PolicyError, PolicyParameters, TaxpayerInput, status_entry};

/// Amount by which the child tax credit is reduced at `agi`.
///
/// Fails when the table has no threshold for `status` or when
/// `phase_out_step` is not positive.
pub fn child_tax_credit_phase_out(
    agi: Decimal,
    status: FilingStatus,
    params: &PolicyParameters,
) -> Result<Decimal, PolicyError> {
    let ctc = &params.child_tax_credit;
    if ctc.phase_out_step <= Decimal::ZERO {
        return Err(PolicyError::NotPositive {
            field: "child_tax_credit.phase_out_step",
            value: ctc.phase_out_step,
        });
    }
    let threshold = *status_entry(
        "child_tax_credit.phase_out_threshold",
        &ctc.phase_out_threshold,
        status,
    )?;

    if agi <= threshold {
        return Ok(Decimal::ZERO);
    }
    let steps = ((agi - threshold) / ctc.phase_out_step).ceil();
    Ok(steps * ctc.phase_out_rate)
}

/// Child tax credit plus credit for other dependents, after phase-out.
pub fn child_tax_credit(
    input: &TaxpayerInput,
    agi: Decimal,
    params: &PolicyParameters,
) -> Result<Decimal, PolicyError> {
    let ctc = &params.child_tax_credit;
    let base = ctc.max_per_child * Decimal::from(input.child_tax_credit_dependents)
        + ctc.other_dependent_credit * Decimal::from(input.other_dependents);
    if base.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let phase_out = child_tax_credit_phase_out(agi, input.filing_status, params)?;
    let credit = max(base - phase_out, Decimal::ZERO);
    debug!(%base, %phase_out, %credit, "child tax credit");
    Ok(credit)
}

/// Refundable part of the child tax credit: whatever `tax_available` could
/// not absorb, limited per qualifying child.
pub fn additional_child_tax_credit(
    input: &TaxpayerInput,
    child_tax_credit: Decimal,
    tax_available: Decimal,
    params: &PolicyParameters,
) -> Decimal {
    let unabsorbed = max(child_tax_credit - max(tax_available, Decimal::ZERO), Decimal::ZERO);
    let limit = params.child_tax_credit.refundable_limit
        * Decimal::from(input.child_tax_credit_dependents);
    min(unabsorbed, limit)
}

/// Flat earned income credit: the table maximum when AGI is within the
/// limit for the filer's child count and status, otherwise nothing.
pub fn earned_income_credit(
    input: &TaxpayerInput,
    agi: Decimal,
    params: &PolicyParameters,
) -> Result<Decimal, PolicyError> {
    let limits = params.eitc_limits_for(input.qualifying_children_for_eic, input.filing_status)?;

    if input.is_dependent || input.is_qualifying_child_of_another {
        debug!("claimed by another taxpayer; no earned income credit");
        return Ok(Decimal::ZERO);
    }
    if input.qualifying_children_for_eic == 0
        && !(input.is_over_25_under_65 && input.lived_in_us_half_year)
    {
        debug!("childless filer fails age or residency test; no earned income credit");
        return Ok(Decimal::ZERO);
    }

    if agi <= limits.max_agi {
        Ok(limits.max_credit)
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Scales `amount` linearly from full at `start` to nothing at `end`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::phase_out_linear;
///
/// assert_eq!(phase_out_linear(dec!(2000), dec!(85000), dec!(80000), dec!(90000)), dec!(1000));
/// assert_eq!(phase_out_linear(dec!(2000), dec!(90000), dec!(80000), dec!(90000)), dec!(0));
/// ```
pub fn phase_out_linear(
    amount: Decimal,
    agi: Decimal,
    start: Decimal,
    end: Decimal,
) -> Decimal {
    let agi = max(agi, Decimal::ZERO);
    if agi >= end {
        return Decimal::ZERO;
    }
    if agi <= start {
        return amount;
    }
    round_half_up(amount * (end - agi) / (end - start))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCredits {
    pub american_opportunity_nonrefundable: Decimal,
    pub american_opportunity_refundable: Decimal,
    pub lifetime_learning: Decimal,
}

pub fn education_credits(
    input: &TaxpayerInput,
    agi: Decimal,
    params: &PolicyParameters,
) -> Result<EducationCredits, PolicyError> {
    let education = &params.education_credits;
    let status = input.filing_status;

    let aotc = &education.american_opportunity;
    let aotc = phase_out_linear(
        min(input.american_opportunity_credit, aotc.max_credit),
        agi,
        *status_entry("education_credits.american_opportunity", &aotc.phase_out_start, status)?,
        *status_entry("education_credits.american_opportunity", &aotc.phase_out_end, status)?,
    );

    let llc = &education.lifetime_learning;
    let lifetime_learning = phase_out_linear(
        min(input.lifetime_learning_credit, llc.max_credit),
        agi,
        *status_entry("education_credits.lifetime_learning", &llc.phase_out_start, status)?,
        *status_entry("education_credits.lifetime_learning", &llc.phase_out_end, status)?,
    );

    let refundable = min(aotc, education.american_opportunity_refundable_cap);
    Ok(EducationCredits {
        american_opportunity_nonrefundable: aotc - refundable,
        american_opportunity_refundable: refundable,
        lifetime_learning,
    })
}

/// Saver's credit per eligible person, with a hard cutoff at the income
/// limit. At most two people count on a joint return, one otherwise.
pub fn retirement_savings_credit(
    input: &TaxpayerInput,
    agi: Decimal,
    params: &PolicyParameters,
) -> Result<Decimal, PolicyError> {
    let savers = &params.retirement_savings_credit;
    let limit = *status_entry(
        "retirement_savings_credit.income_limit",
        &savers.income_limit,
        input.filing_status,
    )?;

    let max_persons = match input.filing_status {
        FilingStatus::MarriedFilingJointly => 2,
        _ => 1,
    };
    let persons = input.retirement_savings_eligible_persons.min(max_persons);

    if persons == 0 || agi > limit {
        return Ok(Decimal::ZERO);
    }
    Ok(savers.max_credit * Decimal::from(persons))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn with_children(children: u32) -> TaxpayerInput {
        TaxpayerInput {
            child_tax_credit_dependents: children,
            ..Default::default()
        }
    }

    // =========================================================================
    // child tax credit tests
    // =========================================================================

    #[test]
    fn child_tax_credit_full_below_threshold() {
        let params = PolicyParameters::default();

        let result = child_tax_credit(&with_children(2), dec!(150000), &params);

        assert_eq!(result, Ok(dec!(4000)));
    }

    #[test]
    fn child_tax_credit_fully_phased_out_at_250k() {
        let params = PolicyParameters::default();

        let phase_out = child_tax_credit_phase_out(dec!(250000), FilingStatus::Single, &params);
        let credit = child_tax_credit(&with_children(1), dec!(250000), &params);

        assert_eq!(phase_out, Ok(dec!(2500)));
        assert_eq!(credit, Ok(dec!(0)));
    }

    #[test]
    fn child_tax_credit_phase_out_rejects_zero_step() {
        let mut params = PolicyParameters::default();
        params.child_tax_credit.phase_out_step = dec!(0);

        let result = child_tax_credit_phase_out(dec!(250000), FilingStatus::Single, &params);

        assert_eq!(
            result,
            Err(PolicyError::NotPositive {
                field: "child_tax_credit.phase_out_step",
                value: dec!(0),
            })
        );
    }

    #[test]
    fn child_tax_credit_phase_out_rounds_partial_steps_up() {
        let params = PolicyParameters::default();

        let result = child_tax_credit_phase_out(dec!(200001), FilingStatus::Single, &params);

        assert_eq!(result, Ok(dec!(50)));
    }

    #[test]
    fn child_tax_credit_uses_joint_threshold() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            ..with_children(1)
        };

        let result = child_tax_credit(&input, dec!(250000), &params);

        assert_eq!(result, Ok(dec!(2000)));
    }

    #[test]
    fn child_tax_credit_includes_other_dependents() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            other_dependents: 2,
            ..with_children(1)
        };

        let result = child_tax_credit(&input, dec!(80000), &params);

        assert_eq!(result, Ok(dec!(3000)));
    }

    #[test]
    fn child_tax_credit_reports_missing_threshold() {
        let mut params = PolicyParameters::default();
        params
            .child_tax_credit
            .phase_out_threshold
            .remove(&FilingStatus::Single);

        let result = child_tax_credit(&with_children(1), dec!(80000), &params);

        assert_eq!(
            result,
            Err(PolicyError::MissingEntry {
                table: "child_tax_credit.phase_out_threshold",
                status: FilingStatus::Single,
            })
        );
    }

    #[test]
    fn additional_child_tax_credit_refunds_unabsorbed_part() {
        let params = PolicyParameters::default();

        let result = additional_child_tax_credit(&with_children(2), dec!(4000), dec!(1500), &params);

        assert_eq!(result, dec!(2500));
    }

    #[test]
    fn additional_child_tax_credit_capped_per_child() {
        let params = PolicyParameters::default();

        let result = additional_child_tax_credit(&with_children(1), dec!(2000), dec!(0), &params);

        assert_eq!(result, dec!(1700));
    }

    #[test]
    fn additional_child_tax_credit_zero_when_tax_absorbs_credit() {
        let params = PolicyParameters::default();

        let result = additional_child_tax_credit(&with_children(1), dec!(2000), dec!(5000), &params);

        assert_eq!(result, dec!(0));
    }

    // =========================================================================
    // earned income credit tests
    // =========================================================================

    #[test]
    fn eitc_two_children_joint_within_limit() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            qualifying_children_for_eic: 2,
            ..Default::default()
        };

        let result = earned_income_credit(&input, dec!(50000), &params);

        assert_eq!(result, Ok(dec!(6960)));
    }

    #[test]
    fn eitc_cliff_above_max_agi() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            qualifying_children_for_eic: 1,
            ..Default::default()
        };

        let at_limit = earned_income_credit(&input, dec!(49084), &params);
        let over_limit = earned_income_credit(&input, dec!(49085), &params);

        assert_eq!(at_limit, Ok(dec!(4213)));
        assert_eq!(over_limit, Ok(dec!(0)));
    }

    #[test]
    fn eitc_caps_children_at_three() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            qualifying_children_for_eic: 5,
            ..Default::default()
        };

        let result = earned_income_credit(&input, dec!(30000), &params);

        assert_eq!(result, Ok(dec!(7753)));
    }

    #[test]
    fn eitc_childless_filer_needs_age_and_residency() {
        let params = PolicyParameters::default();
        let too_young = TaxpayerInput::default();
        let eligible = TaxpayerInput {
            is_over_25_under_65: true,
            ..Default::default()
        };
        let abroad = TaxpayerInput {
            lived_in_us_half_year: false,
            ..eligible.clone()
        };

        assert_eq!(earned_income_credit(&too_young, dec!(10000), &params), Ok(dec!(0)));
        assert_eq!(earned_income_credit(&eligible, dec!(10000), &params), Ok(dec!(632)));
        assert_eq!(earned_income_credit(&abroad, dec!(10000), &params), Ok(dec!(0)));
    }

    #[test]
    fn eitc_denied_to_dependents() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            is_dependent: true,
            qualifying_children_for_eic: 1,
            ..Default::default()
        };

        let result = earned_income_credit(&input, dec!(20000), &params);

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn eitc_zero_for_separate_filers() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingSeparately,
            qualifying_children_for_eic: 2,
            ..Default::default()
        };

        let result = earned_income_credit(&input, dec!(0), &params);

        assert_eq!(result, Ok(dec!(0)));
    }

    // =========================================================================
    // education credit tests
    // =========================================================================

    #[test]
    fn phase_out_linear_keeps_full_amount_below_start() {
        let result = phase_out_linear(dec!(2500), dec!(50000), dec!(80000), dec!(90000));

        assert_eq!(result, dec!(2500));
    }

    #[test]
    fn phase_out_linear_rounds_to_cents() {
        let result = phase_out_linear(dec!(2000), dec!(83333), dec!(80000), dec!(90000));

        assert_eq!(result, dec!(1333.40));
    }

    #[test]
    fn phase_out_linear_degenerate_range_gives_nothing() {
        let result = phase_out_linear(dec!(2000), dec!(-100), dec!(0), dec!(0));

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn education_credits_split_american_opportunity() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            american_opportunity_credit: dec!(3000),
            lifetime_learning_credit: dec!(1200),
            ..Default::default()
        };

        let result = education_credits(&input, dec!(60000), &params);

        assert_eq!(
            result,
            Ok(EducationCredits {
                american_opportunity_nonrefundable: dec!(1000),
                american_opportunity_refundable: dec!(1500),
                lifetime_learning: dec!(1200),
            })
        );
    }

    #[test]
    fn education_credits_phase_out_midway() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            american_opportunity_credit: dec!(2500),
            ..Default::default()
        };

        let result = education_credits(&input, dec!(85000), &params).unwrap();

        assert_eq!(result.american_opportunity_refundable, dec!(1250));
        assert_eq!(result.american_opportunity_nonrefundable, dec!(0));
    }

    #[test]
    fn education_credits_unavailable_when_filing_separately() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingSeparately,
            american_opportunity_credit: dec!(2500),
            lifetime_learning_credit: dec!(2000),
            ..Default::default()
        };

        let result = education_credits(&input, dec!(20000), &params);

        assert_eq!(result, Ok(EducationCredits::default()));
    }

    // =========================================================================
    // retirement savings credit tests
    // =========================================================================

    #[test]
    fn retirement_savings_credit_per_person_on_joint_return() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            retirement_savings_eligible_persons: 3,
            ..Default::default()
        };

        let result = retirement_savings_credit(&input, dec!(60000), &params);

        assert_eq!(result, Ok(dec!(2000)));
    }

    #[test]
    fn retirement_savings_credit_limits_single_filer_to_one_person() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            retirement_savings_eligible_persons: 2,
            ..Default::default()
        };

        let result = retirement_savings_credit(&input, dec!(30000), &params);

        assert_eq!(result, Ok(dec!(1000)));
    }

    #[test]
    fn retirement_savings_credit_cliff_above_limit() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            filing_status: FilingStatus::HeadOfHousehold,
            retirement_savings_eligible_persons: 1,
            ..Default::default()
        };

        assert_eq!(retirement_savings_credit(&input, dec!(54750), &params), Ok(dec!(1000)));
        assert_eq!(retirement_savings_credit(&input, dec!(54751), &params), Ok(dec!(0)));
    }
}
