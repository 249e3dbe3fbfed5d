//! Partial policy overlays.
//!
//! A [`PolicyOverrides`] value names only the entries it changes. Scalar
//! fields replace the current value when present; status-keyed tables are
//! merged key by key, so overriding the Single standard deduction leaves the
//! other statuses alone. A bracket schedule is replaced as a whole for each
//! status it names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::policy::{ByStatus, EitcLimits, PolicyError, PolicyParameters, TaxBracket};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_year: Option<i32>,
    pub standard_deduction: ByStatus<Decimal>,
    pub additional_deduction: ByStatus<Decimal>,
    pub brackets: ByStatus<Vec<TaxBracket>>,
    pub child_tax_credit: ChildTaxCreditOverrides,
    pub eitc: EitcOverrides,
    pub education_credits: EducationCreditOverrides,
    pub retirement_savings_credit: RetirementSavingsCreditOverrides,
    pub self_employment: SelfEmploymentTaxOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_security_taxable_share: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub educator_expense_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_loan_interest_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excess_social_security_limit: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChildTaxCreditOverrides {
    pub max_per_child: Option<Decimal>,
    pub refundable_limit: Option<Decimal>,
    pub phase_out_threshold: ByStatus<Decimal>,
    pub phase_out_rate: Option<Decimal>,
    pub phase_out_step: Option<Decimal>,
    pub other_dependent_credit: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EitcOverrides {
    pub no_children: ByStatus<EitcLimits>,
    pub one_child: ByStatus<EitcLimits>,
    pub two_children: ByStatus<EitcLimits>,
    pub three_or_more: ByStatus<EitcLimits>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseOutCreditOverrides {
    pub max_credit: Option<Decimal>,
    pub phase_out_start: ByStatus<Decimal>,
    pub phase_out_end: ByStatus<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EducationCreditOverrides {
    pub american_opportunity: PhaseOutCreditOverrides,
    pub lifetime_learning: PhaseOutCreditOverrides,
    pub american_opportunity_refundable_cap: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetirementSavingsCreditOverrides {
    pub income_limit: ByStatus<Decimal>,
    pub max_credit: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelfEmploymentTaxOverrides {
    pub taxable_percentage: Option<Decimal>,
    pub full_rate: Option<Decimal>,
    pub wage_base_limit: Option<Decimal>,
    pub social_security_rate: Option<Decimal>,
    pub medicare_rate: Option<Decimal>,
    pub minimum_net_earnings: Option<Decimal>,
}

fn set<T: Copy>(
    target: &mut T,
    patch: Option<T>,
) {
    if let Some(value) = patch {
        *target = value;
    }
}

fn merge<T: Clone>(
    target: &mut ByStatus<T>,
    patch: &ByStatus<T>,
) {
    for (status, value) in patch {
        target.insert(*status, value.clone());
    }
}

impl PolicyOverrides {
    /// Layers another set of overrides on top of this one. Entries in
    /// `later` win.
    pub fn extend(
        &mut self,
        later: PolicyOverrides,
    ) {
        if later.tax_year.is_some() {
            self.tax_year = later.tax_year;
        }
        self.standard_deduction.extend(later.standard_deduction);
        self.additional_deduction.extend(later.additional_deduction);
        self.brackets.extend(later.brackets);

        let ctc = later.child_tax_credit;
        self.child_tax_credit.max_per_child = ctc.max_per_child.or(self.child_tax_credit.max_per_child);
        self.child_tax_credit.refundable_limit = ctc.refundable_limit.or(self.child_tax_credit.refundable_limit);
        self.child_tax_credit.phase_out_threshold.extend(ctc.phase_out_threshold);
        self.child_tax_credit.phase_out_rate = ctc.phase_out_rate.or(self.child_tax_credit.phase_out_rate);
        self.child_tax_credit.phase_out_step = ctc.phase_out_step.or(self.child_tax_credit.phase_out_step);
        self.child_tax_credit.other_dependent_credit = ctc
            .other_dependent_credit
            .or(self.child_tax_credit.other_dependent_credit);

        self.eitc.no_children.extend(later.eitc.no_children);
        self.eitc.one_child.extend(later.eitc.one_child);
        self.eitc.two_children.extend(later.eitc.two_children);
        self.eitc.three_or_more.extend(later.eitc.three_or_more);

        let education = later.education_credits;
        self.education_credits.american_opportunity.extend(education.american_opportunity);
        self.education_credits.lifetime_learning.extend(education.lifetime_learning);
        self.education_credits.american_opportunity_refundable_cap = education
            .american_opportunity_refundable_cap
            .or(self.education_credits.american_opportunity_refundable_cap);

        let savers = later.retirement_savings_credit;
        self.retirement_savings_credit.income_limit.extend(savers.income_limit);
        self.retirement_savings_credit.max_credit = savers.max_credit.or(self.retirement_savings_credit.max_credit);

        let se = later.self_employment;
        let current = &mut self.self_employment;
        current.taxable_percentage = se.taxable_percentage.or(current.taxable_percentage);
        current.full_rate = se.full_rate.or(current.full_rate);
        current.wage_base_limit = se.wage_base_limit.or(current.wage_base_limit);
        current.social_security_rate = se.social_security_rate.or(current.social_security_rate);
        current.medicare_rate = se.medicare_rate.or(current.medicare_rate);
        current.minimum_net_earnings = se.minimum_net_earnings.or(current.minimum_net_earnings);

        self.social_security_taxable_share = later
            .social_security_taxable_share
            .or(self.social_security_taxable_share);
        self.educator_expense_limit = later.educator_expense_limit.or(self.educator_expense_limit);
        self.student_loan_interest_limit = later
            .student_loan_interest_limit
            .or(self.student_loan_interest_limit);
        self.excess_social_security_limit = later
            .excess_social_security_limit
            .or(self.excess_social_security_limit);
    }
}

impl PhaseOutCreditOverrides {
    fn extend(
        &mut self,
        later: PhaseOutCreditOverrides,
    ) {
        self.max_credit = later.max_credit.or(self.max_credit);
        self.phase_out_start.extend(later.phase_out_start);
        self.phase_out_end.extend(later.phase_out_end);
    }
}

impl PolicyParameters {
    /// Returns a copy of this table with `overrides` applied, validated.
    ///
    /// The receiver is left untouched, so a rejected overlay never leaves a
    /// half-applied table behind.
    pub fn with_overrides(
        &self,
        overrides: &PolicyOverrides,
    ) -> Result<PolicyParameters, PolicyError> {
        let mut next = self.clone();

        set(&mut next.tax_year, overrides.tax_year);
        merge(&mut next.standard_deduction, &overrides.standard_deduction);
        merge(&mut next.additional_deduction, &overrides.additional_deduction);
        merge(&mut next.brackets, &overrides.brackets);

        let ctc = &overrides.child_tax_credit;
        set(&mut next.child_tax_credit.max_per_child, ctc.max_per_child);
        set(&mut next.child_tax_credit.refundable_limit, ctc.refundable_limit);
        merge(&mut next.child_tax_credit.phase_out_threshold, &ctc.phase_out_threshold);
        set(&mut next.child_tax_credit.phase_out_rate, ctc.phase_out_rate);
        set(&mut next.child_tax_credit.phase_out_step, ctc.phase_out_step);
        set(&mut next.child_tax_credit.other_dependent_credit, ctc.other_dependent_credit);

        merge(&mut next.eitc.no_children, &overrides.eitc.no_children);
        merge(&mut next.eitc.one_child, &overrides.eitc.one_child);
        merge(&mut next.eitc.two_children, &overrides.eitc.two_children);
        merge(&mut next.eitc.three_or_more, &overrides.eitc.three_or_more);

        for (target, patch) in [
            (
                &mut next.education_credits.american_opportunity,
                &overrides.education_credits.american_opportunity,
            ),
            (
                &mut next.education_credits.lifetime_learning,
                &overrides.education_credits.lifetime_learning,
            ),
        ] {
            set(&mut target.max_credit, patch.max_credit);
            merge(&mut target.phase_out_start, &patch.phase_out_start);
            merge(&mut target.phase_out_end, &patch.phase_out_end);
        }
        set(
            &mut next.education_credits.american_opportunity_refundable_cap,
            overrides.education_credits.american_opportunity_refundable_cap,
        );

        let savers = &overrides.retirement_savings_credit;
        merge(&mut next.retirement_savings_credit.income_limit, &savers.income_limit);
        set(&mut next.retirement_savings_credit.max_credit, savers.max_credit);

        let se = &overrides.self_employment;
        set(&mut next.self_employment.taxable_percentage, se.taxable_percentage);
        set(&mut next.self_employment.full_rate, se.full_rate);
        set(&mut next.self_employment.wage_base_limit, se.wage_base_limit);
        set(&mut next.self_employment.social_security_rate, se.social_security_rate);
        set(&mut next.self_employment.medicare_rate, se.medicare_rate);
        set(&mut next.self_employment.minimum_net_earnings, se.minimum_net_earnings);

        set(&mut next.social_security_taxable_share, overrides.social_security_taxable_share);
        set(&mut next.educator_expense_limit, overrides.educator_expense_limit);
        set(&mut next.student_loan_interest_limit, overrides.student_loan_interest_limit);
        set(&mut next.excess_social_security_limit, overrides.excess_social_security_limit);

        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatus;

    #[test]
    fn empty_overrides_change_nothing() {
        let params = PolicyParameters::default();

        let result = params.with_overrides(&PolicyOverrides::default()).unwrap();

        assert_eq!(result, params);
    }

    #[test]
    fn status_tables_merge_by_key() {
        let params = PolicyParameters::default();
        let mut overrides = PolicyOverrides::default();
        overrides
            .standard_deduction
            .insert(FilingStatus::Single, dec!(15000));

        let result = params.with_overrides(&overrides).unwrap();

        assert_eq!(result.standard_deduction_for(FilingStatus::Single), Ok(dec!(15000)));
        assert_eq!(
            result.standard_deduction_for(FilingStatus::MarriedFilingJointly),
            Ok(dec!(29200))
        );
    }

    #[test]
    fn scalar_overrides_replace_values() {
        let params = PolicyParameters::default();
        let overrides = PolicyOverrides {
            tax_year: Some(2025),
            self_employment: SelfEmploymentTaxOverrides {
                wage_base_limit: Some(dec!(176100)),
                ..Default::default()
            },
            ..Default::default()
        };

        let result = params.with_overrides(&overrides).unwrap();

        assert_eq!(result.tax_year, 2025);
        assert_eq!(result.self_employment.wage_base_limit, dec!(176100));
        assert_eq!(result.self_employment.full_rate, dec!(0.153));
    }

    #[test]
    fn invalid_overlay_is_rejected_and_source_untouched() {
        let params = PolicyParameters::default();
        let overrides = PolicyOverrides {
            social_security_taxable_share: Some(dec!(1.5)),
            ..Default::default()
        };

        let result = params.with_overrides(&overrides);

        assert_eq!(
            result,
            Err(PolicyError::RateOutOfRange {
                field: "social_security_taxable_share",
                value: dec!(1.5),
            })
        );
        assert_eq!(params.social_security_taxable_share, dec!(0.85));
    }

    #[test]
    fn bracket_override_replaces_whole_schedule() {
        let params = PolicyParameters::default();
        let mut overrides = PolicyOverrides::default();
        overrides.brackets.insert(
            FilingStatus::Single,
            vec![
                TaxBracket::new(dec!(0.10), dec!(0)),
                TaxBracket::new(dec!(0.20), dec!(50000)),
            ],
        );

        let result = params.with_overrides(&overrides).unwrap();

        assert_eq!(result.brackets_for(FilingStatus::Single).unwrap().len(), 2);
        assert_eq!(result.brackets_for(FilingStatus::HeadOfHousehold).unwrap().len(), 7);
    }

    #[test]
    fn extend_prefers_later_entries() {
        let mut base = PolicyOverrides {
            educator_expense_limit: Some(dec!(250)),
            student_loan_interest_limit: Some(dec!(2000)),
            ..Default::default()
        };
        base.standard_deduction.insert(FilingStatus::Single, dec!(14000));

        let mut later = PolicyOverrides {
            educator_expense_limit: Some(dec!(300)),
            ..Default::default()
        };
        later.standard_deduction.insert(FilingStatus::Single, dec!(15000));

        base.extend(later);

        assert_eq!(base.educator_expense_limit, Some(dec!(300)));
        assert_eq!(base.student_loan_interest_limit, Some(dec!(2000)));
        assert_eq!(base.standard_deduction[&FilingStatus::Single], dec!(15000));
    }

    #[test]
    fn deserializes_sparse_json() {
        let json = r#"{
            "standard_deduction": { "HOH": "22000" },
            "child_tax_credit": { "max_per_child": "2200" }
        }"#;

        let overrides: PolicyOverrides = serde_json::from_str(json).unwrap();

        assert_eq!(
            overrides.standard_deduction[&FilingStatus::HeadOfHousehold],
            dec!(22000)
        );
        assert_eq!(overrides.child_tax_credit.max_per_child, Some(dec!(2200)));
        assert_eq!(overrides.tax_year, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let json = r#"{ "standard_deductions": {} }"#;

        let result: Result<PolicyOverrides, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
