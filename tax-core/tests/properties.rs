use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::calculations::{SelfEmploymentTax, common::round_whole_dollars};
use tax_core::{FilingStatus, PolicyParameters, TaxpayerInput, compute};

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..50_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-5_000_000i64..50_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn status() -> impl Strategy<Value = FilingStatus> {
    prop::sample::select(FilingStatus::ALL.to_vec())
}

prop_compose! {
    fn taxpayer()(
        filing_status in status(),
        wages in amount(),
        business_income in signed_amount(),
        long_term_capital_gain in signed_amount(),
        ira_deduction in amount(),
        interest_paid in amount(),
        children in 0u32..5,
        force_itemized_deduction in any::<bool>(),
        prefer_larger_deduction in any::<bool>(),
        is_65_or_older in any::<bool>(),
    ) -> TaxpayerInput {
        TaxpayerInput {
            filing_status,
            wages,
            business_income,
            long_term_capital_gain,
            ira_deduction,
            interest_paid,
            child_tax_credit_dependents: children,
            qualifying_children_for_eic: children,
            force_itemized_deduction,
            prefer_larger_deduction,
            is_65_or_older,
            ..Default::default()
        }
    }
}

proptest! {
    #[test]
    fn taxable_income_is_never_negative(input in taxpayer()) {
        let result = compute(&input, &PolicyParameters::default()).unwrap();

        prop_assert!(result.effective_deduction >= Decimal::ZERO);
        prop_assert!(result.taxable_income >= Decimal::ZERO);
        prop_assert_eq!(
            result.taxable_income,
            (result.agi - result.effective_deduction).max(Decimal::ZERO)
        );
    }

    #[test]
    fn tax_after_credits_is_never_negative(input in taxpayer()) {
        let result = compute(&input, &PolicyParameters::default()).unwrap();

        prop_assert!(result.tax_after_credits >= Decimal::ZERO);
        prop_assert!(result.tax_after_credits <= result.bracket_tax);
    }

    #[test]
    fn computation_is_idempotent(input in taxpayer()) {
        let params = PolicyParameters::default();

        prop_assert_eq!(compute(&input, &params), compute(&input, &params));
    }

    #[test]
    fn se_deduction_is_half_the_tax_rounded(income in signed_amount()) {
        let input = TaxpayerInput {
            business_income: income,
            ..Default::default()
        };

        let se = SelfEmploymentTax::calculate(&input, &PolicyParameters::default());

        prop_assert_eq!(se.deduction, round_whole_dollars(se.tax / dec!(2)));
    }
}
