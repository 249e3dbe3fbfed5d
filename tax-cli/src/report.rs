//! Presentation of computed returns.
//!
//! The engine keeps exact values; this module is the only place where
//! money is rounded to whole dollars.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use tax_core::ComputationResult;
use tax_core::calculations::common::round_whole_dollars;

/// Formats `amount` as whole dollars with thousands separators.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_cli::report::whole_dollars;
///
/// assert_eq!(whole_dollars(dec!(14129.55)), "14,130");
/// assert_eq!(whole_dollars(dec!(-1234567.4)), "-1,234,567");
/// ```
pub fn whole_dollars(amount: Decimal) -> String {
    let rounded = round_whole_dollars(amount);
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits);

    if rounded < Decimal::ZERO {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a rate such as `0.22` as `22.0%`.
pub fn percent(rate: Decimal) -> String {
    let value =
        (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{value:.1}%")
}

/// Line-by-line text rendering of one return.
pub struct Report<'a> {
    result: &'a ComputationResult,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a ComputationResult) -> Self {
        Self { result }
    }
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
) -> fmt::Result {
    writeln!(f, "  {label:<36}{value:>14}")
}

fn money(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    amount: Decimal,
) -> fmt::Result {
    line(f, label, &whole_dollars(amount))
}

fn heading(
    f: &mut fmt::Formatter<'_>,
    title: &str,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")
}

impl fmt::Display for Report<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;

        writeln!(f, "Form 1040 estimate, tax year {} ({})", r.tax_year, r.filing_status)?;

        heading(f, "Income")?;
        money(f, "Wages", r.total_wages)?;
        money(f, "Other income", r.total_other_income)?;
        money(f, "Taxable Social Security", r.taxable_social_security_benefits)?;
        money(f, "Total income", r.total_income)?;

        heading(f, "Adjustments")?;
        if r.self_employment_income > Decimal::ZERO {
            money(f, "Self-employment income", r.self_employment_income)?;
            money(f, "Deductible part of SE tax", r.self_employment_tax_deduction)?;
        }
        money(f, "Total adjustments", r.total_adjustments)?;
        money(f, "Adjusted gross income", r.agi)?;

        heading(f, "Deduction")?;
        money(f, "Standard deduction", r.standard_deduction)?;
        money(f, "Itemized deductions", r.itemized_deduction)?;
        let used = if r.used_itemized_deduction {
            "Deduction taken (itemized)"
        } else {
            "Deduction taken (standard)"
        };
        money(f, used, r.effective_deduction)?;
        money(f, "Taxable income", r.taxable_income)?;

        heading(f, "Tax")?;
        money(f, "Tax from brackets", r.bracket_tax)?;
        line(f, "Marginal rate", &percent(r.marginal_rate))?;

        let credits = [
            ("Child tax credit", r.credits.child_tax_credit),
            ("American opportunity credit", r.credits.american_opportunity_nonrefundable),
            ("Lifetime learning credit", r.credits.lifetime_learning),
            ("Retirement savings credit", r.credits.retirement_savings),
        ];
        for (label, amount) in credits {
            if amount > Decimal::ZERO {
                money(f, label, amount)?;
            }
        }
        money(f, "Nonrefundable credits", r.total_nonrefundable_credits)?;
        money(f, "Tax after credits", r.tax_after_credits)?;
        if r.self_employment_tax > Decimal::ZERO {
            money(f, "Self-employment tax", r.self_employment_tax)?;
        }
        money(f, "Other taxes", r.total_additional_taxes)?;
        money(f, "Total tax", r.total_tax)?;

        heading(f, "Payments")?;
        let refundable = [
            ("Additional child tax credit", r.credits.additional_child_tax_credit),
            ("Earned income credit", r.credits.earned_income_credit),
            ("Refundable opportunity credit", r.credits.american_opportunity_refundable),
        ];
        for (label, amount) in refundable {
            if amount > Decimal::ZERO {
                money(f, label, amount)?;
            }
        }
        money(f, "Payments and refundable credits", r.total_payments_and_refundable_credits)?;

        writeln!(f)?;
        if r.is_refund() {
            money(f, "Refund", r.final_balance)?;
        } else {
            money(f, "Amount owed", r.amount_owed())?;
        }
        line(f, "Effective rate", &percent(r.effective_rate))
    }
}

/// Renders every return as text, separated by blank lines.
pub fn render_table(results: &[ComputationResult]) -> String {
    results
        .iter()
        .map(|result| Report::new(result).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders exact values as JSON: a single object for one return, an array
/// otherwise.
pub fn render_json(results: &[ComputationResult]) -> serde_json::Result<String> {
    match results {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
}
