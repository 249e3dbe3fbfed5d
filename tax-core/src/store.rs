//! Session-scoped holder for the active policy table.

use tracing::{debug, info};

use crate::calculations::compute;
use crate::models::{ComputationResult, PolicyError, PolicyOverrides, PolicyParameters, TaxpayerInput};

/// Owns the current [`PolicyParameters`] and a revision counter.
///
/// Every successful edit replaces the whole table and bumps the revision.
/// Rejected edits leave both untouched.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{FilingStatus, PolicyOverrides, PolicyStore};
///
/// let mut store = PolicyStore::default();
/// let mut overrides = PolicyOverrides::default();
/// overrides.standard_deduction.insert(FilingStatus::Single, dec!(15000));
///
/// let revision = store.apply(&overrides).unwrap();
///
/// assert_eq!(revision, 1);
/// assert_eq!(store.current().standard_deduction_for(FilingStatus::Single), Ok(dec!(15000)));
/// ```
#[derive(Debug, Clone)]
pub struct PolicyStore {
    current: PolicyParameters,
    defaults: PolicyParameters,
    revision: u64,
}

impl Default for PolicyStore {
    fn default() -> Self {
        let defaults = PolicyParameters::default_2024();
        Self {
            current: defaults.clone(),
            defaults,
            revision: 0,
        }
    }
}

impl PolicyStore {
    /// Starts a store whose defaults (the target of [`reset`](Self::reset))
    /// are `defaults`.
    pub fn new(defaults: PolicyParameters) -> Result<Self, PolicyError> {
        defaults.validate()?;
        Ok(Self {
            current: defaults.clone(),
            defaults,
            revision: 0,
        })
    }

    pub fn current(&self) -> &PolicyParameters {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the whole table.
    pub fn replace(
        &mut self,
        params: PolicyParameters,
    ) -> Result<u64, PolicyError> {
        params.validate()?;
        Ok(self.install(params))
    }

    /// Merges `overrides` into the current table.
    pub fn apply(
        &mut self,
        overrides: &PolicyOverrides,
    ) -> Result<u64, PolicyError> {
        let next = self.current.with_overrides(overrides)?;
        Ok(self.install(next))
    }

    /// Restores the defaults the store was created with.
    pub fn reset(&mut self) -> u64 {
        let defaults = self.defaults.clone();
        self.install(defaults)
    }

    /// Computes `input` against the current table.
    pub fn compute(
        &self,
        input: &TaxpayerInput,
    ) -> Result<ComputationResult, PolicyError> {
        debug!(revision = self.revision, "computing with current policy");
        compute(input, &self.current)
    }

    fn install(
        &mut self,
        params: PolicyParameters,
    ) -> u64 {
        self.current = params;
        self.revision += 1;
        info!(
            revision = self.revision,
            tax_year = self.current.tax_year,
            "policy table updated"
        );
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatus;

    #[test]
    fn starts_at_revision_zero_with_defaults() {
        let store = PolicyStore::default();

        assert_eq!(store.revision(), 0);
        assert_eq!(store.current(), &PolicyParameters::default_2024());
    }

    #[test]
    fn rejected_edit_keeps_current_table() {
        let mut store = PolicyStore::default();
        let mut params = PolicyParameters::default();
        params.brackets.remove(&FilingStatus::Single);

        let result = store.replace(params);

        assert!(result.is_err());
        assert_eq!(store.revision(), 0);
        assert_eq!(store.current(), &PolicyParameters::default_2024());
    }

    #[test]
    fn reset_restores_defaults_and_bumps_revision() {
        let mut store = PolicyStore::default();
        let overrides = PolicyOverrides {
            educator_expense_limit: Some(dec!(500)),
            ..Default::default()
        };
        store.apply(&overrides).unwrap();

        let revision = store.reset();

        assert_eq!(revision, 2);
        assert_eq!(store.current().educator_expense_limit, dec!(300));
    }

    #[test]
    fn overrides_accumulate_across_edits() {
        let mut store = PolicyStore::default();
        let first = PolicyOverrides {
            tax_year: Some(2025),
            ..Default::default()
        };
        let second = PolicyOverrides {
            student_loan_interest_limit: Some(dec!(3000)),
            ..Default::default()
        };

        store.apply(&first).unwrap();
        store.apply(&second).unwrap();

        assert_eq!(store.current().tax_year, 2025);
        assert_eq!(store.current().student_loan_interest_limit, dec!(3000));
    }

    #[test]
    fn compute_uses_current_table() {
        let mut store = PolicyStore::default();
        let mut overrides = PolicyOverrides::default();
        overrides
            .standard_deduction
            .insert(FilingStatus::Single, dec!(20000));
        store.apply(&overrides).unwrap();
        let input = TaxpayerInput {
            wages: dec!(60000),
            ..Default::default()
        };

        let result = store.compute(&input).unwrap();

        assert_eq!(result.taxable_income, dec!(40000));
    }
}
