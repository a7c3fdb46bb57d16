//! Display formatting for currency and percentages.

use rust_decimal::Decimal;

use crate::calculations::common::{round_percent, round_whole};

/// Placeholder for cash fields of a vehicle that does not apply.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Placeholder for a percentage that is undefined (zero denominator).
pub const NOT_APPLICABLE: &str = "N/A";

/// Whole-dollar amount with thousands separators, e.g. `$1,234,568`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use bizplan_core::calculations::format::format_currency;
///
/// assert_eq!(format_currency(dec!(1234567.5)), "$1,234,568");
/// assert_eq!(format_currency(dec!(-950.25)), "-$950");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_whole(amount);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// One decimal place and a trailing `%`, e.g. `23.4%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.1}%", round_percent(percent))
}

pub fn format_optional_percent(percent: Option<Decimal>) -> String {
    percent
        .map(format_percent)
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(dec!(0)), "$0");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(dec!(1000)), "$1,000");
        assert_eq!(format_currency(dec!(100000)), "$100,000");
        assert_eq!(format_currency(dec!(12345678)), "$12,345,678");
    }

    #[test]
    fn currency_rounds_to_whole_dollars() {
        assert_eq!(format_currency(dec!(4055.50)), "$4,056");
        assert_eq!(format_currency(dec!(4055.49)), "$4,055");
    }

    #[test]
    fn currency_negative_amounts_lead_with_sign() {
        assert_eq!(format_currency(dec!(-1234.4)), "-$1,234");
    }

    #[test]
    fn currency_small_negative_rounds_to_zero_without_sign() {
        assert_eq!(format_currency(dec!(-0.4)), "$0");
    }

    #[test]
    fn percent_has_one_decimal_place() {
        assert_eq!(format_percent(dec!(23.45)), "23.5%");
        assert_eq!(format_percent(dec!(7)), "7.0%");
        assert_eq!(format_percent(dec!(0)), "0.0%");
        assert_eq!(format_percent(dec!(33.333333)), "33.3%");
    }

    #[test]
    fn percent_just_under_midpoint_rounds_down() {
        assert_eq!(format_percent(dec!(12.2496)), "12.2%");
    }

    #[test]
    fn optional_percent_uses_placeholder() {
        assert_eq!(format_optional_percent(None), "N/A");
        assert_eq!(format_optional_percent(Some(dec!(12.04))), "12.0%");
    }
}
