//! Shared arithmetic helpers for the planner calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::PlannerError;

/// Largest dollar amount any profile field may carry. Every product the
/// comparators form from inputs at or below this stays inside `Decimal`'s
/// range.
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000);

/// # Errors
///
/// [`PlannerError::Validation`] naming `field` when `value` exceeds
/// [`MAX_AMOUNT`].
pub fn ensure_within_max(
    field: &str,
    value: Decimal,
) -> Result<(), PlannerError> {
    if value > MAX_AMOUNT {
        return Err(PlannerError::validation(format!(
            "{field} must not exceed {MAX_AMOUNT}, got {value}"
        )));
    }
    Ok(())
}

/// Rounds to cents, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use bizplan_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1049.125)), dec!(1049.13));
/// assert_eq!(round_half_up(dec!(-10.005)), dec!(-10.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole dollar, half away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to one decimal place, half away from zero.
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Restricts `value` to `[low, high]`. `low` wins if the bounds cross.
pub fn clamp(
    value: Decimal,
    low: Decimal,
    high: Decimal,
) -> Decimal {
    max(value.min(high), low)
}

/// `(1 + rate)^years`, compounded once per year.
pub fn growth_factor(
    annual_rate: Decimal,
    years: u32,
) -> Decimal {
    let step = Decimal::ONE + annual_rate;
    (0..years).fold(Decimal::ONE, |acc, _| acc * step)
}

/// `numerator / denominator × 100`, or `None` when the denominator is zero.
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator * Decimal::ONE_HUNDRED)
    }
}
