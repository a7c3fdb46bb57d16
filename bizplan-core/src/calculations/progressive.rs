//! Progressive bracket tax.
//!
//! Brackets are walked in ascending order. Each bracket absorbs at most
//! `max - min + 1` dollars of the remaining income at its own rate, and the
//! final unbounded bracket absorbs whatever is left.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use bizplan_core::TaxBracket;
//! use bizplan_core::calculations::ProgressiveTaxSchedule;
//!
//! let brackets = vec![
//!     TaxBracket::bounded(dec!(0), dec!(9999), dec!(0.10)),
//!     TaxBracket::unbounded(dec!(10000), dec!(0.20)),
//! ];
//!
//! let schedule = ProgressiveTaxSchedule::new(&brackets).unwrap();
//!
//! assert_eq!(schedule.calculate(dec!(10000)), dec!(1000.00));
//! assert_eq!(schedule.calculate(dec!(15000)), dec!(2000.00));
//! ```

use rust_decimal::Decimal;

use crate::TaxBracket;
use crate::calculations::common::round_half_up;
use crate::error::PlannerError;

/// A validated, ascending bracket schedule.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxSchedule<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTaxSchedule<'a> {
    /// Wraps `brackets` after checking that they partition `[0, ∞)`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Internal`] if the table is empty, does not start at
    /// zero, has a gap or overlap, has a rate outside `[0, 1]`, or has an
    /// unbounded bracket anywhere but last.
    pub fn new(brackets: &'a [TaxBracket]) -> Result<Self, PlannerError> {
        let first = brackets
            .first()
            .ok_or_else(|| PlannerError::internal("bracket table is empty"))?;
        if !first.min_income.is_zero() {
            return Err(PlannerError::internal(format!(
                "first bracket must start at 0, starts at {}",
                first.min_income
            )));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
                return Err(PlannerError::internal(format!(
                    "bracket {index} rate {} is outside [0, 1]",
                    bracket.tax_rate
                )));
            }

            match (bracket.max_income, index == last_index) {
                (None, true) => {}
                (None, false) => {
                    return Err(PlannerError::internal(format!(
                        "bracket {index} is unbounded but is not the last bracket"
                    )));
                }
                (Some(max), true) => {
                    return Err(PlannerError::internal(format!(
                        "last bracket ends at {max}; it must be unbounded"
                    )));
                }
                (Some(max), false) => {
                    if max < bracket.min_income {
                        return Err(PlannerError::internal(format!(
                            "bracket {index} ends ({max}) before it starts ({})",
                            bracket.min_income
                        )));
                    }
                    let next_min = brackets[index + 1].min_income;
                    if next_min != max + Decimal::ONE {
                        return Err(PlannerError::internal(format!(
                            "gap or overlap between bracket {index} (max {max}) and bracket {} (min {next_min})",
                            index + 1
                        )));
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &'a [TaxBracket] {
        self.brackets
    }

    /// Total tax on `income`, rounded to cents. Non-positive income owes nothing.
    pub fn calculate(
        &self,
        income: Decimal,
    ) -> Decimal {
        round_half_up(self.tax_unrounded(income))
    }

    /// Tax attributable to `extra` when stacked on top of `base` income.
    pub fn incremental(
        &self,
        base: Decimal,
        extra: Decimal,
    ) -> Decimal {
        round_half_up(self.tax_unrounded(base + extra) - self.tax_unrounded(base))
    }

    /// Rate applied to the dollar that follows `income`.
    #[cfg(test)]
    pub(crate) fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        let mut consumed = Decimal::ZERO;
        for bracket in self.brackets {
            match bracket.width() {
                Some(width) if income >= consumed + width => consumed += width,
                _ => return bracket.tax_rate,
            }
        }
        // Unreachable for a validated schedule: the last bracket is unbounded.
        self.brackets
            .last()
            .map(|b| b.tax_rate)
            .unwrap_or(Decimal::ZERO)
    }

    pub(crate) fn tax_unrounded(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut remaining = income;
        let mut tax = Decimal::ZERO;
        for bracket in self.brackets {
            let taxed_here = match bracket.width() {
                Some(width) => remaining.min(width),
                None => remaining,
            };
            tax += taxed_here * bracket.tax_rate;
            remaining -= taxed_here;
            if remaining <= Decimal::ZERO {
                break;
            }
        }
        tax
    }
}

/// Convenience wrapper: validates `brackets` and taxes `income` in one call.
pub fn calculate_personal_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Result<Decimal, PlannerError> {
    Ok(ProgressiveTaxSchedule::new(brackets)?.calculate(income))
}
