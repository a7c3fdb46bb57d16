//! Personal tax on non-eligible dividends.
//!
//! The dividend is grossed up and stacked on top of other income, so the
//! tax attributable to it is the difference between the schedule applied to
//! `other + grossed_up` and to `other` alone. Federal and provincial credits,
//! each a share of the grossed-up amount, are then subtracted. Credits never
//! push the result below zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::ProgressiveTaxSchedule;
use crate::calculations::common::{max, round_half_up};
use crate::models::DividendConstants;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendTax {
    pub dividend: Decimal,
    pub gross_up: Decimal,
    pub grossed_up_dividend: Decimal,
    /// Incremental schedule tax before credits.
    pub tax_before_credits: Decimal,
    pub federal_credit: Decimal,
    pub provincial_credit: Decimal,
    pub tax: Decimal,
}

pub fn calculate_dividend_tax(
    dividend: Decimal,
    other_income: Decimal,
    schedule: &ProgressiveTaxSchedule<'_>,
    constants: &DividendConstants,
) -> DividendTax {
    if dividend <= Decimal::ZERO {
        return DividendTax {
            dividend: Decimal::ZERO,
            gross_up: Decimal::ZERO,
            grossed_up_dividend: Decimal::ZERO,
            tax_before_credits: Decimal::ZERO,
            federal_credit: Decimal::ZERO,
            provincial_credit: Decimal::ZERO,
            tax: Decimal::ZERO,
        };
    }

    let gross_up = round_half_up(dividend * constants.gross_up_rate);
    let grossed_up_dividend = dividend + gross_up;

    let tax_before_credits = schedule.incremental(other_income, grossed_up_dividend);
    let federal_credit = round_half_up(grossed_up_dividend * constants.federal_credit_rate);
    let provincial_credit = round_half_up(grossed_up_dividend * constants.provincial_credit_rate);

    let tax = max(
        tax_before_credits - federal_credit - provincial_credit,
        Decimal::ZERO,
    );

    DividendTax {
        dividend,
        gross_up,
        grossed_up_dividend,
        tax_before_credits,
        federal_credit,
        provincial_credit,
        tax,
    }
}
