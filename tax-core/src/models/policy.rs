//! Tax-year policy parameters.
//!
//! Every calculator reads its constants from a [`PolicyParameters`] value that
//! is passed in explicitly. Tables are keyed by [`FilingStatus`]; a missing
//! key is a configuration defect and surfaces as [`PolicyError::MissingEntry`]
//! instead of silently reading as zero.
//!
//! # Bracket thresholds
//!
//! A schedule is an ordered list of `{rate, threshold}` pairs. Each threshold
//! is the lower boundary of its bracket: income above `threshold` (up to the
//! next threshold) is taxed at `rate`. The first threshold is always 0.
//!
//! | Single 2024 | rate |
//! |-------------|------|
//! | 0           | 10%  |
//! | 11,600      | 12%  |
//! | 47,150      | 22%  |
//! | 100,525     | 24%  |
//! | 191,950     | 32%  |
//! | 243,725     | 35%  |
//! | 609,350     | 37%  |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FilingStatus;

/// A table with one entry per filing status.
pub type ByStatus<T> = BTreeMap<FilingStatus, T>;

/// Configuration defects in a policy table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy table '{table}' has no entry for {status}")]
    MissingEntry {
        table: &'static str,
        status: FilingStatus,
    },

    #[error("bracket schedule for {0} is empty")]
    EmptyBracketSchedule(FilingStatus),

    #[error("bracket schedule for {status} must start at 0, starts at {threshold}")]
    FirstThresholdNotZero {
        status: FilingStatus,
        threshold: Decimal,
    },

    #[error("bracket thresholds for {status} are not strictly increasing at index {index}")]
    ThresholdsNotIncreasing { status: FilingStatus, index: usize },

    #[error("bracket rates for {status} are not strictly increasing at index {index}")]
    RatesNotIncreasing { status: FilingStatus, index: usize },

    #[error("{field} must be between 0 and 1, got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },

    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    #[error("{credit} phase-out for {status} ends ({end}) before it starts ({start})")]
    PhaseOutRangeInverted {
        credit: &'static str,
        status: FilingStatus,
        start: Decimal,
        end: Decimal,
    },
}

/// Looks up a status-keyed entry, failing loudly when it is absent.
pub(crate) fn status_entry<'a, T>(
    table: &'static str,
    map: &'a ByStatus<T>,
    status: FilingStatus,
) -> Result<&'a T, PolicyError> {
    map.get(&status)
        .ok_or(PolicyError::MissingEntry { table, status })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Marginal rate, e.g. `0.12` for 12%.
    pub rate: Decimal,
    /// Lower boundary of the bracket.
    pub threshold: Decimal,
}

impl TaxBracket {
    pub fn new(
        rate: Decimal,
        threshold: Decimal,
    ) -> Self {
        Self { rate, threshold }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditParams {
    pub max_per_child: Decimal,
    /// Refundable (additional child tax credit) ceiling per qualifying child.
    pub refundable_limit: Decimal,
    pub phase_out_threshold: ByStatus<Decimal>,
    /// Reduction per started `phase_out_step` of AGI over the threshold.
    pub phase_out_rate: Decimal,
    pub phase_out_step: Decimal,
    /// Credit for each dependent who is not a qualifying child.
    pub other_dependent_credit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcLimits {
    pub max_agi: Decimal,
    pub max_credit: Decimal,
}

/// EITC limits by number of qualifying children (capped at three).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcTable {
    pub no_children: ByStatus<EitcLimits>,
    pub one_child: ByStatus<EitcLimits>,
    pub two_children: ByStatus<EitcLimits>,
    pub three_or_more: ByStatus<EitcLimits>,
}

impl EitcTable {
    pub fn row(
        &self,
        qualifying_children: u32,
    ) -> &ByStatus<EitcLimits> {
        match qualifying_children {
            0 => &self.no_children,
            1 => &self.one_child,
            2 => &self.two_children,
            _ => &self.three_or_more,
        }
    }

    fn rows(&self) -> [(&'static str, &ByStatus<EitcLimits>); 4] {
        [
            ("eitc.no_children", &self.no_children),
            ("eitc.one_child", &self.one_child),
            ("eitc.two_children", &self.two_children),
            ("eitc.three_or_more", &self.three_or_more),
        ]
    }
}

/// A credit that phases out linearly between two AGI levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutCredit {
    pub max_credit: Decimal,
    pub phase_out_start: ByStatus<Decimal>,
    pub phase_out_end: ByStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditParams {
    pub american_opportunity: PhaseOutCredit,
    pub lifetime_learning: PhaseOutCredit,
    /// Ceiling on the refundable part of the American Opportunity credit.
    pub american_opportunity_refundable_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementSavingsCreditParams {
    pub income_limit: ByStatus<Decimal>,
    /// Credit per eligible person.
    pub max_credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentTaxParams {
    /// Share of self-employment income subject to SE tax (92.35%).
    pub taxable_percentage: Decimal,
    /// Combined Social Security + Medicare rate below the wage base (15.3%).
    pub full_rate: Decimal,
    /// Social Security wage base.
    pub wage_base_limit: Decimal,
    /// Social Security rate applied to the wage base once it is exceeded (12.4%).
    pub social_security_rate: Decimal,
    /// Medicare rate applied to all taxable SE income once the base is exceeded (2.9%).
    pub medicare_rate: Decimal,
    /// Taxable SE income at or below this amount owes no SE tax. Zero by
    /// default; the IRS filing floor is $400.
    pub minimum_net_earnings: Decimal,
}

/// The full set of constants for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParameters {
    pub tax_year: i32,
    pub standard_deduction: ByStatus<Decimal>,
    /// Added once per age-65 or blindness flag.
    pub additional_deduction: ByStatus<Decimal>,
    pub brackets: ByStatus<Vec<TaxBracket>>,
    pub child_tax_credit: ChildTaxCreditParams,
    pub eitc: EitcTable,
    pub education_credits: EducationCreditParams,
    pub retirement_savings_credit: RetirementSavingsCreditParams,
    pub self_employment: SelfEmploymentTaxParams,
    /// Share of gross Social Security benefits treated as taxable when no
    /// pre-computed figure is supplied.
    pub social_security_taxable_share: Decimal,
    /// Educator expense ceiling per eligible educator.
    pub educator_expense_limit: Decimal,
    pub student_loan_interest_limit: Decimal,
    /// Ceiling on excess Social Security withholding claimed as a payment.
    pub excess_social_security_limit: Decimal,
}

impl Default for PolicyParameters {
    fn default() -> Self {
        Self::default_2024()
    }
}

fn by_status<T: Clone>(
    single: T,
    joint: T,
    separate: T,
    head: T,
    widow: T,
) -> ByStatus<T> {
    BTreeMap::from([
        (FilingStatus::Single, single),
        (FilingStatus::MarriedFilingJointly, joint),
        (FilingStatus::MarriedFilingSeparately, separate),
        (FilingStatus::HeadOfHousehold, head),
        (FilingStatus::QualifyingWidow, widow),
    ])
}

fn schedule(pairs: &[(Decimal, Decimal)]) -> Vec<TaxBracket> {
    pairs
        .iter()
        .map(|&(rate, threshold)| TaxBracket::new(rate, threshold))
        .collect()
}

fn eitc(
    max_agi: Decimal,
    max_credit: Decimal,
) -> EitcLimits {
    EitcLimits {
        max_agi,
        max_credit,
    }
}

fn eitc_row(
    unmarried_agi: Decimal,
    joint_agi: Decimal,
    max_credit: Decimal,
) -> ByStatus<EitcLimits> {
    by_status(
        eitc(unmarried_agi, max_credit),
        eitc(joint_agi, max_credit),
        eitc(dec!(0), dec!(0)),
        eitc(unmarried_agi, max_credit),
        eitc(joint_agi, max_credit),
    )
}

impl PolicyParameters {
    /// The 2024 tax-year table.
    pub fn default_2024() -> Self {
        let joint_schedule = schedule(&[
            (dec!(0.10), dec!(0)),
            (dec!(0.12), dec!(23200)),
            (dec!(0.22), dec!(94300)),
            (dec!(0.24), dec!(201050)),
            (dec!(0.32), dec!(383900)),
            (dec!(0.35), dec!(487450)),
            (dec!(0.37), dec!(731200)),
        ]);

        let education_phase_out = PhaseOutCredit {
            max_credit: dec!(0),
            phase_out_start: by_status(dec!(80000), dec!(160000), dec!(0), dec!(80000), dec!(160000)),
            phase_out_end: by_status(dec!(90000), dec!(180000), dec!(0), dec!(90000), dec!(180000)),
        };

        Self {
            tax_year: 2024,
            standard_deduction: by_status(
                dec!(14600),
                dec!(29200),
                dec!(14600),
                dec!(21900),
                dec!(29200),
            ),
            additional_deduction: by_status(
                dec!(1950),
                dec!(1550),
                dec!(1550),
                dec!(1950),
                dec!(1550),
            ),
            brackets: by_status(
                schedule(&[
                    (dec!(0.10), dec!(0)),
                    (dec!(0.12), dec!(11600)),
                    (dec!(0.22), dec!(47150)),
                    (dec!(0.24), dec!(100525)),
                    (dec!(0.32), dec!(191950)),
                    (dec!(0.35), dec!(243725)),
                    (dec!(0.37), dec!(609350)),
                ]),
                joint_schedule.clone(),
                schedule(&[
                    (dec!(0.10), dec!(0)),
                    (dec!(0.12), dec!(11600)),
                    (dec!(0.22), dec!(47150)),
                    (dec!(0.24), dec!(100525)),
                    (dec!(0.32), dec!(191950)),
                    (dec!(0.35), dec!(243725)),
                    (dec!(0.37), dec!(365600)),
                ]),
                schedule(&[
                    (dec!(0.10), dec!(0)),
                    (dec!(0.12), dec!(17400)),
                    (dec!(0.22), dec!(67500)),
                    (dec!(0.24), dec!(108400)),
                    (dec!(0.32), dec!(189450)),
                    (dec!(0.35), dec!(243700)),
                    (dec!(0.37), dec!(609350)),
                ]),
                joint_schedule,
            ),
            child_tax_credit: ChildTaxCreditParams {
                max_per_child: dec!(2000),
                refundable_limit: dec!(1700),
                phase_out_threshold: by_status(
                    dec!(200000),
                    dec!(400000),
                    dec!(200000),
                    dec!(200000),
                    dec!(400000),
                ),
                phase_out_rate: dec!(50),
                phase_out_step: dec!(1000),
                other_dependent_credit: dec!(500),
            },
            eitc: EitcTable {
                no_children: eitc_row(dec!(18591), dec!(25511), dec!(632)),
                one_child: eitc_row(dec!(49084), dec!(56004), dec!(4213)),
                two_children: eitc_row(dec!(55768), dec!(62688), dec!(6960)),
                three_or_more: eitc_row(dec!(59478), dec!(66398), dec!(7753)),
            },
            education_credits: EducationCreditParams {
                american_opportunity: PhaseOutCredit {
                    max_credit: dec!(2500),
                    ..education_phase_out.clone()
                },
                lifetime_learning: PhaseOutCredit {
                    max_credit: dec!(2000),
                    ..education_phase_out
                },
                american_opportunity_refundable_cap: dec!(1500),
            },
            retirement_savings_credit: RetirementSavingsCreditParams {
                income_limit: by_status(
                    dec!(36500),
                    dec!(73000),
                    dec!(36500),
                    dec!(54750),
                    dec!(73000),
                ),
                max_credit: dec!(1000),
            },
            self_employment: SelfEmploymentTaxParams {
                taxable_percentage: dec!(0.9235),
                full_rate: dec!(0.153),
                wage_base_limit: dec!(168600),
                social_security_rate: dec!(0.124),
                medicare_rate: dec!(0.029),
                minimum_net_earnings: Decimal::ZERO,
            },
            social_security_taxable_share: dec!(0.85),
            educator_expense_limit: dec!(300),
            student_loan_interest_limit: dec!(2500),
            excess_social_security_limit: dec!(9870.60),
        }
    }

    pub fn standard_deduction_for(
        &self,
        status: FilingStatus,
    ) -> Result<Decimal, PolicyError> {
        status_entry("standard_deduction", &self.standard_deduction, status).copied()
    }

    pub fn additional_deduction_for(
        &self,
        status: FilingStatus,
    ) -> Result<Decimal, PolicyError> {
        status_entry("additional_deduction", &self.additional_deduction, status).copied()
    }

    /// The bracket schedule for `status`. An empty schedule is a defect.
    pub fn brackets_for(
        &self,
        status: FilingStatus,
    ) -> Result<&[TaxBracket], PolicyError> {
        let schedule = status_entry("brackets", &self.brackets, status)?;
        if schedule.is_empty() {
            return Err(PolicyError::EmptyBracketSchedule(status));
        }
        Ok(schedule)
    }

    /// EITC cell for the given child count (capped at three) and status.
    pub fn eitc_limits_for(
        &self,
        qualifying_children: u32,
        status: FilingStatus,
    ) -> Result<EitcLimits, PolicyError> {
        let index = qualifying_children.min(3) as usize;
        let (table, row) = self.eitc.rows()[index];
        status_entry(table, row, status).copied()
    }

    /// Checks every invariant of the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found:
    /// - any status-keyed table missing a filing status
    /// - an empty bracket schedule, one not starting at 0, or one whose
    ///   thresholds or rates are not strictly increasing
    /// - a rate outside [0, 1]
    /// - a negative amount
    /// - a phase-out range whose end precedes its start
    pub fn validate(&self) -> Result<(), PolicyError> {
        for status in FilingStatus::ALL {
            non_negative("standard_deduction", self.standard_deduction_for(status)?)?;
            non_negative("additional_deduction", self.additional_deduction_for(status)?)?;
            self.validate_schedule(status)?;

            non_negative(
                "child_tax_credit.phase_out_threshold",
                *status_entry(
                    "child_tax_credit.phase_out_threshold",
                    &self.child_tax_credit.phase_out_threshold,
                    status,
                )?,
            )?;

            for (table, row) in self.eitc.rows() {
                let limits = status_entry(table, row, status)?;
                non_negative("eitc.max_agi", limits.max_agi)?;
                non_negative("eitc.max_credit", limits.max_credit)?;
            }

            validate_phase_out(
                "education_credits.american_opportunity",
                &self.education_credits.american_opportunity,
                status,
            )?;
            validate_phase_out(
                "education_credits.lifetime_learning",
                &self.education_credits.lifetime_learning,
                status,
            )?;

            non_negative(
                "retirement_savings_credit.income_limit",
                *status_entry(
                    "retirement_savings_credit.income_limit",
                    &self.retirement_savings_credit.income_limit,
                    status,
                )?,
            )?;
        }

        let ctc = &self.child_tax_credit;
        non_negative("child_tax_credit.max_per_child", ctc.max_per_child)?;
        non_negative("child_tax_credit.refundable_limit", ctc.refundable_limit)?;
        non_negative("child_tax_credit.phase_out_rate", ctc.phase_out_rate)?;
        non_negative("child_tax_credit.other_dependent_credit", ctc.other_dependent_credit)?;
        if ctc.phase_out_step <= Decimal::ZERO {
            return Err(PolicyError::NotPositive {
                field: "child_tax_credit.phase_out_step",
                value: ctc.phase_out_step,
            });
        }

        non_negative(
            "education_credits.american_opportunity_refundable_cap",
            self.education_credits.american_opportunity_refundable_cap,
        )?;
        non_negative(
            "retirement_savings_credit.max_credit",
            self.retirement_savings_credit.max_credit,
        )?;

        let se = &self.self_employment;
        unit_rate("self_employment.taxable_percentage", se.taxable_percentage)?;
        unit_rate("self_employment.full_rate", se.full_rate)?;
        unit_rate("self_employment.social_security_rate", se.social_security_rate)?;
        unit_rate("self_employment.medicare_rate", se.medicare_rate)?;
        non_negative("self_employment.wage_base_limit", se.wage_base_limit)?;
        non_negative("self_employment.minimum_net_earnings", se.minimum_net_earnings)?;

        unit_rate("social_security_taxable_share", self.social_security_taxable_share)?;
        non_negative("educator_expense_limit", self.educator_expense_limit)?;
        non_negative("student_loan_interest_limit", self.student_loan_interest_limit)?;
        non_negative("excess_social_security_limit", self.excess_social_security_limit)?;

        Ok(())
    }

    fn validate_schedule(
        &self,
        status: FilingStatus,
    ) -> Result<(), PolicyError> {
        let schedule = self.brackets_for(status)?;

        if schedule[0].threshold != Decimal::ZERO {
            return Err(PolicyError::FirstThresholdNotZero {
                status,
                threshold: schedule[0].threshold,
            });
        }
        for bracket in schedule {
            unit_rate("brackets.rate", bracket.rate)?;
        }
        for (index, pair) in schedule.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(PolicyError::ThresholdsNotIncreasing {
                    status,
                    index: index + 1,
                });
            }
            if pair[1].rate <= pair[0].rate {
                return Err(PolicyError::RatesNotIncreasing {
                    status,
                    index: index + 1,
                });
            }
        }
        Ok(())
    }
}

fn validate_phase_out(
    credit: &'static str,
    params: &PhaseOutCredit,
    status: FilingStatus,
) -> Result<(), PolicyError> {
    non_negative(credit, params.max_credit)?;
    let start = *status_entry(credit, &params.phase_out_start, status)?;
    let end = *status_entry(credit, &params.phase_out_end, status)?;
    if end < start {
        return Err(PolicyError::PhaseOutRangeInverted {
            credit,
            status,
            start,
            end,
        });
    }
    Ok(())
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), PolicyError> {
    if value < Decimal::ZERO {
        return Err(PolicyError::NegativeAmount { field, value });
    }
    Ok(())
}

fn unit_rate(
    field: &'static str,
    value: Decimal,
) -> Result<(), PolicyError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PolicyError::RateOutOfRange { field, value });
    }
    Ok(())
}
