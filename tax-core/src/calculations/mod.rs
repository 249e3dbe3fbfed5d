//! Form 1040 calculators.
//!
//! Each submodule covers one stage of the return, from income through
//! credits. [`compute`] runs them in order and assembles a
//! [`ComputationResult`](crate::ComputationResult).

pub mod adjustments;
pub mod brackets;
pub mod common;
pub mod credits;
pub mod deductions;
pub mod income;
mod pipeline;

pub use adjustments::{
    SelfEmploymentTax, educator_expense_deduction, self_employment_income, self_employment_tax,
    self_employment_tax_deduction, student_loan_interest_deduction, total_adjustments,
};
pub use brackets::{bracket_tax, marginal_rate};
pub use credits::{
    EducationCredits, additional_child_tax_credit, child_tax_credit, child_tax_credit_phase_out,
    earned_income_credit, education_credits, phase_out_linear, retirement_savings_credit,
};
pub use deductions::{EffectiveDeduction, effective_deduction, itemized_deduction, standard_deduction};
pub use income::{taxable_social_security, total_income, total_other_income, total_wages};
pub use pipeline::compute;
