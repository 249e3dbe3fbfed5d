mod computation_result;
mod fields;
mod filing_status;
mod policy;
mod policy_overrides;
mod taxpayer_input;

pub use computation_result::{ComputationResult, CreditBreakdown};
pub use fields::{FieldError, MAX_AMOUNT, parse_decimal};
pub use filing_status::FilingStatus;
pub(crate) use policy::status_entry;
pub use policy::{
    ByStatus, ChildTaxCreditParams, EducationCreditParams, EitcLimits, EitcTable, PhaseOutCredit,
    PolicyError, PolicyParameters, RetirementSavingsCreditParams, SelfEmploymentTaxParams,
    TaxBracket,
};
pub use policy_overrides::{
    ChildTaxCreditOverrides, EducationCreditOverrides, EitcOverrides, PhaseOutCreditOverrides,
    PolicyOverrides, RetirementSavingsCreditOverrides, SelfEmploymentTaxOverrides,
};
pub use taxpayer_input::TaxpayerInput;
