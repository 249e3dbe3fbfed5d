//! Income aggregation (Form 1040 lines 1 through 9).
//!
//! Every income item is counted exactly once. Gross Social Security benefits
//! never enter total income; only the taxable portion does.

use rust_decimal::Decimal;

use crate::models::{PolicyParameters, TaxpayerInput};

fn wage_figure(
    wages: Decimal,
    medicare_wages_differ: bool,
    medicare_wages: Decimal,
) -> Decimal {
    if medicare_wages_differ { medicare_wages } else { wages }
}

/// Primary wages plus, on a joint return, spouse wages.
///
/// When a "Medicare wages differ" flag is set, the W-2 box 5 figure replaces
/// the box 1 figure for that person.
pub fn total_wages(input: &TaxpayerInput) -> Decimal {
    let primary = wage_figure(
        input.wages,
        input.medicare_wages_differ,
        input.medicare_wages,
    );
    let spouse = if input.filing_status.includes_spouse_wages() {
        wage_figure(
            input.spouse_wages,
            input.spouse_medicare_wages_differ,
            input.spouse_medicare_wages,
        )
    } else {
        Decimal::ZERO
    };
    primary + spouse
}

/// The pre-computed taxable amount when supplied, otherwise the policy share
/// of gross benefits.
pub fn taxable_social_security(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    input
        .taxable_social_security_benefits
        .unwrap_or(input.social_security_benefits * params.social_security_taxable_share)
}

/// All non-wage income except Social Security.
///
/// Intangible drilling costs are expensed and reduce the total. Tax-exempt
/// interest and qualified dividends are informational and excluded.
pub fn total_other_income(input: &TaxpayerInput) -> Decimal {
    let additions = [
        input.taxable_interest,
        input.ordinary_dividends,
        input.taxable_refunds,
        input.alimony_received,
        input.business_income,
        input.spouse_business_income,
        input.short_term_capital_gain,
        input.long_term_capital_gain,
        input.other_gains,
        input.taxable_ira_distributions,
        input.taxable_pensions,
        input.rental_income_subject_to_niit,
        input.rental_income_not_subject_to_niit,
        input.farm_income,
        input.unemployment_compensation,
        input.scholarships_penal_income,
        input.other_income,
    ];
    additions.iter().sum::<Decimal>() - input.intangible_drilling_costs
}

pub fn total_income(
    input: &TaxpayerInput,
    params: &PolicyParameters,
) -> Decimal {
    total_wages(input) + total_other_income(input) + taxable_social_security(input, params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatus;

    // =========================================================================
    // total_wages tests
    // =========================================================================

    #[test]
    fn total_wages_uses_primary_wages() {
        let input = TaxpayerInput {
            wages: dec!(60000),
            ..Default::default()
        };

        let result = total_wages(&input);

        assert_eq!(result, dec!(60000));
    }

    #[test]
    fn total_wages_prefers_medicare_wages_when_flagged() {
        let input = TaxpayerInput {
            wages: dec!(60000),
            medicare_wages_differ: true,
            medicare_wages: dec!(65000),
            ..Default::default()
        };

        let result = total_wages(&input);

        assert_eq!(result, dec!(65000));
    }

    #[test]
    fn total_wages_ignores_medicare_wages_without_flag() {
        let input = TaxpayerInput {
            wages: dec!(60000),
            medicare_wages: dec!(65000),
            ..Default::default()
        };

        let result = total_wages(&input);

        assert_eq!(result, dec!(60000));
    }

    #[test]
    fn total_wages_adds_spouse_on_joint_return() {
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            wages: dec!(50000),
            spouse_wages: dec!(40000),
            spouse_medicare_wages_differ: true,
            spouse_medicare_wages: dec!(42000),
            ..Default::default()
        };

        let result = total_wages(&input);

        assert_eq!(result, dec!(92000));
    }

    #[test]
    fn total_wages_ignores_spouse_when_filing_separately() {
        let input = TaxpayerInput {
            filing_status: FilingStatus::MarriedFilingSeparately,
            wages: dec!(50000),
            spouse_wages: dec!(40000),
            ..Default::default()
        };

        let result = total_wages(&input);

        assert_eq!(result, dec!(50000));
    }

    // =========================================================================
    // taxable_social_security tests
    // =========================================================================

    #[test]
    fn taxable_social_security_defaults_to_policy_share() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            social_security_benefits: dec!(20000),
            ..Default::default()
        };

        let result = taxable_social_security(&input, &params);

        assert_eq!(result, dec!(17000));
    }

    #[test]
    fn taxable_social_security_prefers_precomputed_value() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            social_security_benefits: dec!(20000),
            taxable_social_security_benefits: Some(dec!(4000)),
            ..Default::default()
        };

        let result = taxable_social_security(&input, &params);

        assert_eq!(result, dec!(4000));
    }

    // =========================================================================
    // total_other_income / total_income tests
    // =========================================================================

    #[test]
    fn other_income_counts_each_item_once_and_subtracts_drilling_costs() {
        let input = TaxpayerInput {
            taxable_interest: dec!(100),
            tax_exempt_interest: dec!(999),
            ordinary_dividends: dec!(200),
            qualified_dividends: dec!(150),
            short_term_capital_gain: dec!(-3000),
            long_term_capital_gain: dec!(5000),
            farm_income: dec!(1000),
            intangible_drilling_costs: dec!(300),
            social_security_benefits: dec!(12000),
            ..Default::default()
        };

        let result = total_other_income(&input);

        assert_eq!(result, dec!(3000));
    }

    #[test]
    fn total_income_includes_only_taxable_social_security() {
        let params = PolicyParameters::default();
        let input = TaxpayerInput {
            wages: dec!(30000),
            taxable_interest: dec!(500),
            social_security_benefits: dec!(10000),
            ..Default::default()
        };

        let result = total_income(&input, &params);

        assert_eq!(result, dec!(39000));
    }
}
