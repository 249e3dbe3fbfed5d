use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields::{FieldError, FieldSlot};
use super::FilingStatus;

/// Everything the taxpayer tells us, as one flat record.
///
/// A value of this type is treated as immutable for the duration of a
/// calculation. Editing produces a new record (see [`TaxpayerInput::with_field`]),
/// which keeps every computation reproducible from its inputs.
///
/// Monetary fields are non-negative unless noted otherwise. Capital gains,
/// other gains, business, spouse business, farm and rental income may be
/// negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxpayerInput {
    // Filing status & dependents
    pub filing_status: FilingStatus,
    pub is_dependent: bool,
    pub child_tax_credit_dependents: u32,
    pub other_dependents: u32,

    // Wages (Form W-2)
    pub wages: Decimal,
    /// Use `medicare_wages` (box 5) instead of `wages` (box 1).
    pub medicare_wages_differ: bool,
    pub medicare_wages: Decimal,
    pub spouse_wages: Decimal,
    pub spouse_medicare_wages_differ: bool,
    pub spouse_medicare_wages: Decimal,

    // Other income
    pub taxable_interest: Decimal,
    /// Informational only; never taxed.
    pub tax_exempt_interest: Decimal,
    pub ordinary_dividends: Decimal,
    /// Informational only; already part of `ordinary_dividends`.
    pub qualified_dividends: Decimal,
    pub taxable_refunds: Decimal,
    pub alimony_received: Decimal,
    pub business_income: Decimal,
    pub spouse_business_income: Decimal,
    pub short_term_capital_gain: Decimal,
    pub long_term_capital_gain: Decimal,
    pub other_gains: Decimal,
    pub taxable_ira_distributions: Decimal,
    pub taxable_pensions: Decimal,
    /// Expensed immediately, reducing other income.
    pub intangible_drilling_costs: Decimal,
    pub rental_income_subject_to_niit: Decimal,
    pub rental_income_not_subject_to_niit: Decimal,
    pub farm_income: Decimal,
    pub unemployment_compensation: Decimal,
    /// Gross benefits (Form SSA-1099 box 5).
    pub social_security_benefits: Decimal,
    /// Pre-computed taxable portion. When `None` the policy share of
    /// `social_security_benefits` is used.
    pub taxable_social_security_benefits: Option<Decimal>,
    pub scholarships_penal_income: Decimal,
    pub other_income: Decimal,

    // Adjustments to income
    pub educator_expenses: Decimal,
    pub employee_business_expenses: Decimal,
    pub hsa_deduction: Decimal,
    pub sep_simple_contributions: Decimal,
    pub self_employed_health_insurance: Decimal,
    pub early_withdrawal_penalty: Decimal,
    pub alimony_paid: Decimal,
    pub ira_deduction: Decimal,
    pub student_loan_interest: Decimal,

    // Deductions
    pub is_65_or_older: bool,
    pub is_blind: bool,
    pub spouse_is_65_or_older: bool,
    pub spouse_is_blind: bool,
    pub force_itemized_deduction: bool,
    /// Take whichever of standard and itemized is larger. Ignored when
    /// `force_itemized_deduction` is set.
    pub prefer_larger_deduction: bool,
    pub medical_dental_expenses: Decimal,
    pub state_local_taxes: Decimal,
    pub interest_paid: Decimal,
    pub charitable_cash_contributions: Decimal,
    pub charitable_non_cash_contributions: Decimal,

    // Nonrefundable credits
    pub foreign_tax_credit: Decimal,
    pub child_dependent_care_credit: Decimal,
    /// Lifetime Learning credit claimed, before phase-out.
    pub lifetime_learning_credit: Decimal,
    /// People (self, and spouse on a joint return) eligible for the saver's credit.
    pub retirement_savings_eligible_persons: u32,
    pub energy_efficient_home_credit: Decimal,
    /// American Opportunity credit claimed, before phase-out.
    pub american_opportunity_credit: Decimal,
    pub other_nonrefundable_credits: Decimal,

    // Additional taxes
    pub unreported_social_security_tax: Decimal,
    pub additional_tax_on_iras: Decimal,
    pub household_employment_taxes: Decimal,
    pub first_time_homebuyer_repayment: Decimal,

    // Payments and refundable credits
    pub federal_income_tax_withheld: Decimal,
    pub estimated_tax_payments: Decimal,
    pub excess_social_security: Decimal,
    pub other_payments: Decimal,
    pub net_premium_tax_credit: Decimal,
    pub other_refundable_credits: Decimal,
    pub qualifying_children_for_eic: u32,
    /// Informational only.
    pub nontaxable_combat_pay: Decimal,
    pub is_over_25_under_65: bool,
    pub lived_in_us_half_year: bool,
    pub is_qualifying_child_of_another: bool,
}

impl Default for TaxpayerInput {
    fn default() -> Self {
        Self {
            filing_status: FilingStatus::Single,
            is_dependent: false,
            child_tax_credit_dependents: 0,
            other_dependents: 0,
            wages: Decimal::ZERO,
            medicare_wages_differ: false,
            medicare_wages: Decimal::ZERO,
            spouse_wages: Decimal::ZERO,
            spouse_medicare_wages_differ: false,
            spouse_medicare_wages: Decimal::ZERO,
            taxable_interest: Decimal::ZERO,
            tax_exempt_interest: Decimal::ZERO,
            ordinary_dividends: Decimal::ZERO,
            qualified_dividends: Decimal::ZERO,
            taxable_refunds: Decimal::ZERO,
            alimony_received: Decimal::ZERO,
            business_income: Decimal::ZERO,
            spouse_business_income: Decimal::ZERO,
            short_term_capital_gain: Decimal::ZERO,
            long_term_capital_gain: Decimal::ZERO,
            other_gains: Decimal::ZERO,
            taxable_ira_distributions: Decimal::ZERO,
            taxable_pensions: Decimal::ZERO,
            intangible_drilling_costs: Decimal::ZERO,
            rental_income_subject_to_niit: Decimal::ZERO,
            rental_income_not_subject_to_niit: Decimal::ZERO,
            farm_income: Decimal::ZERO,
            unemployment_compensation: Decimal::ZERO,
            social_security_benefits: Decimal::ZERO,
            taxable_social_security_benefits: None,
            scholarships_penal_income: Decimal::ZERO,
            other_income: Decimal::ZERO,
            educator_expenses: Decimal::ZERO,
            employee_business_expenses: Decimal::ZERO,
            hsa_deduction: Decimal::ZERO,
            sep_simple_contributions: Decimal::ZERO,
            self_employed_health_insurance: Decimal::ZERO,
            early_withdrawal_penalty: Decimal::ZERO,
            alimony_paid: Decimal::ZERO,
            ira_deduction: Decimal::ZERO,
            student_loan_interest: Decimal::ZERO,
            is_65_or_older: false,
            is_blind: false,
            spouse_is_65_or_older: false,
            spouse_is_blind: false,
            force_itemized_deduction: false,
            prefer_larger_deduction: false,
            medical_dental_expenses: Decimal::ZERO,
            state_local_taxes: Decimal::ZERO,
            interest_paid: Decimal::ZERO,
            charitable_cash_contributions: Decimal::ZERO,
            charitable_non_cash_contributions: Decimal::ZERO,
            foreign_tax_credit: Decimal::ZERO,
            child_dependent_care_credit: Decimal::ZERO,
            lifetime_learning_credit: Decimal::ZERO,
            retirement_savings_eligible_persons: 0,
            energy_efficient_home_credit: Decimal::ZERO,
            american_opportunity_credit: Decimal::ZERO,
            other_nonrefundable_credits: Decimal::ZERO,
            unreported_social_security_tax: Decimal::ZERO,
            additional_tax_on_iras: Decimal::ZERO,
            household_employment_taxes: Decimal::ZERO,
            first_time_homebuyer_repayment: Decimal::ZERO,
            federal_income_tax_withheld: Decimal::ZERO,
            estimated_tax_payments: Decimal::ZERO,
            excess_social_security: Decimal::ZERO,
            other_payments: Decimal::ZERO,
            net_premium_tax_credit: Decimal::ZERO,
            other_refundable_credits: Decimal::ZERO,
            qualifying_children_for_eic: 0,
            nontaxable_combat_pay: Decimal::ZERO,
            is_over_25_under_65: false,
            lived_in_us_half_year: true,
            is_qualifying_child_of_another: false,
        }
    }
}

impl TaxpayerInput {
    /// Names accepted by [`TaxpayerInput::set_field`], in form order.
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "filing_status",
        "is_dependent",
        "child_tax_credit_dependents",
        "other_dependents",
        "wages",
        "medicare_wages_differ",
        "medicare_wages",
        "spouse_wages",
        "spouse_medicare_wages_differ",
        "spouse_medicare_wages",
        "taxable_interest",
        "tax_exempt_interest",
        "ordinary_dividends",
        "qualified_dividends",
        "taxable_refunds",
        "alimony_received",
        "business_income",
        "spouse_business_income",
        "short_term_capital_gain",
        "long_term_capital_gain",
        "other_gains",
        "taxable_ira_distributions",
        "taxable_pensions",
        "intangible_drilling_costs",
        "rental_income_subject_to_niit",
        "rental_income_not_subject_to_niit",
        "farm_income",
        "unemployment_compensation",
        "social_security_benefits",
        "taxable_social_security_benefits",
        "scholarships_penal_income",
        "other_income",
        "educator_expenses",
        "employee_business_expenses",
        "hsa_deduction",
        "sep_simple_contributions",
        "self_employed_health_insurance",
        "early_withdrawal_penalty",
        "alimony_paid",
        "ira_deduction",
        "student_loan_interest",
        "is_65_or_older",
        "is_blind",
        "spouse_is_65_or_older",
        "spouse_is_blind",
        "force_itemized_deduction",
        "prefer_larger_deduction",
        "medical_dental_expenses",
        "state_local_taxes",
        "interest_paid",
        "charitable_cash_contributions",
        "charitable_non_cash_contributions",
        "foreign_tax_credit",
        "child_dependent_care_credit",
        "lifetime_learning_credit",
        "retirement_savings_eligible_persons",
        "energy_efficient_home_credit",
        "american_opportunity_credit",
        "other_nonrefundable_credits",
        "unreported_social_security_tax",
        "additional_tax_on_iras",
        "household_employment_taxes",
        "first_time_homebuyer_repayment",
        "federal_income_tax_withheld",
        "estimated_tax_payments",
        "excess_social_security",
        "other_payments",
        "net_premium_tax_credit",
        "other_refundable_credits",
        "qualifying_children_for_eic",
        "nontaxable_combat_pay",
        "is_over_25_under_65",
        "lived_in_us_half_year",
        "is_qualifying_child_of_another",
    ];

    /// Sets one field from its raw text form.
    ///
    /// Numeric text that cannot be used (non-numeric, or negative where the
    /// field does not allow it) is coerced to zero and logged; it is never an
    /// error. Unknown field names and unrecognised filing statuses are errors.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::TaxpayerInput;
    ///
    /// let mut input = TaxpayerInput::default();
    /// input.set_field("wages", "60,000").unwrap();
    /// input.set_field("business_income", "-1500").unwrap();
    /// input.set_field("hsa_deduction", "-20").unwrap(); // coerced to 0
    ///
    /// assert_eq!(input.wages, dec!(60000));
    /// assert_eq!(input.business_income, dec!(-1500));
    /// assert_eq!(input.hsa_deduction, dec!(0));
    /// ```
    pub fn set_field(
        &mut self,
        key: &str,
        raw: &str,
    ) -> Result<(), FieldError> {
        let slot = self
            .slot_mut(key)
            .ok_or_else(|| FieldError::UnknownField(key.to_string()))?;
        slot.assign(key, raw)
    }

    /// Returns a copy of this record with one field changed.
    pub fn with_field(
        &self,
        key: &str,
        raw: &str,
    ) -> Result<Self, FieldError> {
        let mut next = self.clone();
        next.set_field(key, raw)?;
        Ok(next)
    }

    /// Builds a record from `(key, raw value)` pairs, starting from the default.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut input = Self::default();
        for (key, raw) in fields {
            input.set_field(key, raw)?;
        }
        Ok(input)
    }

    fn slot_mut(
        &mut self,
        key: &str,
    ) -> Option<FieldSlot<'_>> {
        use FieldSlot::*;

        let slot = match key {
            "filing_status" => Status(&mut self.filing_status),
            "is_dependent" => Flag(&mut self.is_dependent),
            "child_tax_credit_dependents" => Count(&mut self.child_tax_credit_dependents),
            "other_dependents" => Count(&mut self.other_dependents),
            "wages" => Amount(&mut self.wages),
            "medicare_wages_differ" => Flag(&mut self.medicare_wages_differ),
            "medicare_wages" => Amount(&mut self.medicare_wages),
            "spouse_wages" => Amount(&mut self.spouse_wages),
            "spouse_medicare_wages_differ" => Flag(&mut self.spouse_medicare_wages_differ),
            "spouse_medicare_wages" => Amount(&mut self.spouse_medicare_wages),
            "taxable_interest" => Amount(&mut self.taxable_interest),
            "tax_exempt_interest" => Amount(&mut self.tax_exempt_interest),
            "ordinary_dividends" => Amount(&mut self.ordinary_dividends),
            "qualified_dividends" => Amount(&mut self.qualified_dividends),
            "taxable_refunds" => Amount(&mut self.taxable_refunds),
            "alimony_received" => Amount(&mut self.alimony_received),
            "business_income" => SignedAmount(&mut self.business_income),
            "spouse_business_income" => SignedAmount(&mut self.spouse_business_income),
            "short_term_capital_gain" => SignedAmount(&mut self.short_term_capital_gain),
            "long_term_capital_gain" => SignedAmount(&mut self.long_term_capital_gain),
            "other_gains" => SignedAmount(&mut self.other_gains),
            "taxable_ira_distributions" => Amount(&mut self.taxable_ira_distributions),
            "taxable_pensions" => Amount(&mut self.taxable_pensions),
            "intangible_drilling_costs" => Amount(&mut self.intangible_drilling_costs),
            "rental_income_subject_to_niit" => SignedAmount(&mut self.rental_income_subject_to_niit),
            "rental_income_not_subject_to_niit" => {
                SignedAmount(&mut self.rental_income_not_subject_to_niit)
            }
            "farm_income" => SignedAmount(&mut self.farm_income),
            "unemployment_compensation" => Amount(&mut self.unemployment_compensation),
            "social_security_benefits" => Amount(&mut self.social_security_benefits),
            "taxable_social_security_benefits" => {
                OptionalAmount(&mut self.taxable_social_security_benefits)
            }
            "scholarships_penal_income" => Amount(&mut self.scholarships_penal_income),
            "other_income" => Amount(&mut self.other_income),
            "educator_expenses" => Amount(&mut self.educator_expenses),
            "employee_business_expenses" => Amount(&mut self.employee_business_expenses),
            "hsa_deduction" => Amount(&mut self.hsa_deduction),
            "sep_simple_contributions" => Amount(&mut self.sep_simple_contributions),
            "self_employed_health_insurance" => Amount(&mut self.self_employed_health_insurance),
            "early_withdrawal_penalty" => Amount(&mut self.early_withdrawal_penalty),
            "alimony_paid" => Amount(&mut self.alimony_paid),
            "ira_deduction" => Amount(&mut self.ira_deduction),
            "student_loan_interest" => Amount(&mut self.student_loan_interest),
            "is_65_or_older" => Flag(&mut self.is_65_or_older),
            "is_blind" => Flag(&mut self.is_blind),
            "spouse_is_65_or_older" => Flag(&mut self.spouse_is_65_or_older),
            "spouse_is_blind" => Flag(&mut self.spouse_is_blind),
            "force_itemized_deduction" => Flag(&mut self.force_itemized_deduction),
            "prefer_larger_deduction" => Flag(&mut self.prefer_larger_deduction),
            "medical_dental_expenses" => Amount(&mut self.medical_dental_expenses),
            "state_local_taxes" => Amount(&mut self.state_local_taxes),
            "interest_paid" => Amount(&mut self.interest_paid),
            "charitable_cash_contributions" => Amount(&mut self.charitable_cash_contributions),
            "charitable_non_cash_contributions" => {
                Amount(&mut self.charitable_non_cash_contributions)
            }
            "foreign_tax_credit" => Amount(&mut self.foreign_tax_credit),
            "child_dependent_care_credit" => Amount(&mut self.child_dependent_care_credit),
            "lifetime_learning_credit" => Amount(&mut self.lifetime_learning_credit),
            "retirement_savings_eligible_persons" => {
                Count(&mut self.retirement_savings_eligible_persons)
            }
            "energy_efficient_home_credit" => Amount(&mut self.energy_efficient_home_credit),
            "american_opportunity_credit" => Amount(&mut self.american_opportunity_credit),
            "other_nonrefundable_credits" => Amount(&mut self.other_nonrefundable_credits),
            "unreported_social_security_tax" => Amount(&mut self.unreported_social_security_tax),
            "additional_tax_on_iras" => Amount(&mut self.additional_tax_on_iras),
            "household_employment_taxes" => Amount(&mut self.household_employment_taxes),
            "first_time_homebuyer_repayment" => Amount(&mut self.first_time_homebuyer_repayment),
            "federal_income_tax_withheld" => Amount(&mut self.federal_income_tax_withheld),
            "estimated_tax_payments" => Amount(&mut self.estimated_tax_payments),
            "excess_social_security" => Amount(&mut self.excess_social_security),
            "other_payments" => Amount(&mut self.other_payments),
            "net_premium_tax_credit" => Amount(&mut self.net_premium_tax_credit),
            "other_refundable_credits" => Amount(&mut self.other_refundable_credits),
            "qualifying_children_for_eic" => Count(&mut self.qualifying_children_for_eic),
            "nontaxable_combat_pay" => Amount(&mut self.nontaxable_combat_pay),
            "is_over_25_under_65" => Flag(&mut self.is_over_25_under_65),
            "lived_in_us_half_year" => Flag(&mut self.lived_in_us_half_year),
            "is_qualifying_child_of_another" => Flag(&mut self.is_qualifying_child_of_another),
            _ => return None,
        };
        Some(slot)
    }
}
