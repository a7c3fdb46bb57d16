use std::fmt::Write;

use bizplan_core::calculations::format::{NOT_AVAILABLE, format_currency, format_optional_percent, format_percent};
use bizplan_core::calculations::{
    BusinessProfile, InvestmentComparison, InvestmentProfile, SalaryDividendStrategy,
    VehicleResult,
};

fn push_province(
    prompt: &mut String,
    province: Option<&str>,
) {
    if let Some(province) = province.map(str::trim).filter(|p| !p.is_empty()) {
        let _ = writeln!(prompt, "Province: {province}");
    }
}

pub fn build_tax_strategy_prompt(
    profile: &BusinessProfile,
    strategies: &[SalaryDividendStrategy],
    province: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("CONTEXT:\n");
    let _ = writeln!(prompt, "Revenue: {}", format_currency(profile.revenue));
    let _ = writeln!(prompt, "Expenses: {}", format_percent(profile.expenses_percentage));
    let _ = writeln!(
        prompt,
        "Net business income: {}",
        format_currency(profile.net_business_income())
    );
    let _ = writeln!(
        prompt,
        "Owner withdrawal: {}",
        format_currency(profile.withdrawal_amount)
    );
    push_province(&mut prompt, province);

    prompt.push_str("\nSTRATEGIES:\n");
    for (i, s) in strategies.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {}: salary {}, dividend {}, personal tax {}, corporate tax {}, total tax {}, net income {}, effective rate {}, RRSP room {}, retained earnings {}",
            i + 1,
            s.name,
            format_currency(s.salary),
            format_currency(s.dividend),
            format_currency(s.personal_tax.total),
            format_currency(s.corporate_tax),
            format_currency(s.total_tax),
            format_currency(s.net_income),
            format_percent(s.effective_tax_rate),
            format_currency(s.rrsp_room),
            format_currency(s.retained_earnings),
        );
    }

    let _ = write!(
        prompt,
        "\nReturn ONLY valid JSON with \"recommendation\" and exactly {} \"strategies\" entries in the order above.",
        strategies.len()
    );
    prompt
}

pub fn build_investment_prompt(
    profile: &InvestmentProfile,
    comparison: &InvestmentComparison,
    province: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("CONTEXT:\n");
    let _ = writeln!(prompt, "Amount to invest: {}", format_currency(profile.amount));
    let _ = writeln!(prompt, "RRSP room: {}", format_currency(profile.rrsp_room));
    let _ = writeln!(prompt, "Current income: {}", profile.current_income.as_str());
    let _ = writeln!(prompt, "Retirement income: {}", profile.retirement_income.as_str());
    let _ = writeln!(prompt, "Years invested: {}", profile.years);
    push_province(&mut prompt, province);

    prompt.push_str("\nVEHICLES:\n");
    for result in &comparison.results {
        match result {
            VehicleResult::Available(o) => {
                let _ = writeln!(
                    prompt,
                    "- {}: invested {}, final value {}, total tax {}, after-tax cash {}, effective rate {}",
                    o.vehicle.name(),
                    format_currency(o.initial_investment),
                    format_currency(o.final_value),
                    format_currency(o.total_tax),
                    format_currency(o.after_tax_cash),
                    format_optional_percent(o.effective_tax_rate),
                );
            }
            VehicleResult::NotApplicable { vehicle, reason } => {
                let _ = writeln!(prompt, "- {}: {} ({})", vehicle.name(), NOT_AVAILABLE, reason);
            }
        }
    }

    prompt.push_str("\nRANKING:\n");
    for ranked in &comparison.ranking {
        let _ = writeln!(prompt, "{}. {}", ranked.rank, ranked.recommendation);
    }

    prompt.push_str("\nReturn ONLY valid JSON with \"summary\" and \"considerations\" keys.");
    prompt
}

#[cfg(test)]
mod tests {
    use bizplan_core::calculations::{InvestmentComparator, SalaryDividendComparator};
    use bizplan_core::{ConstantTable, IncomeBracket};
    use rust_decimal_macros::dec;

    use super::*;

    fn business() -> BusinessProfile {
        BusinessProfile {
            revenue: dec!(200000),
            expenses_percentage: dec!(30),
            withdrawal_amount: dec!(100000),
        }
    }

    #[test]
    fn tax_prompt_lists_every_strategy_in_order() {
        let table = ConstantTable::for_year(2024).unwrap();
        let strategies = SalaryDividendComparator::new(&table)
            .unwrap()
            .compare(&business())
            .unwrap();

        let prompt = build_tax_strategy_prompt(&business(), &strategies, Some("Ontario"));

        assert!(prompt.contains("Revenue: $200,000"));
        assert!(prompt.contains("Net business income: $140,000"));
        assert!(prompt.contains("Province: Ontario"));
        let salary = prompt.find("1. 100% Salary").unwrap();
        let split = prompt.find("4. 65/35 Split").unwrap();
        assert!(salary < split);
        assert!(prompt.contains("exactly 4 \"strategies\""));
    }

    #[test]
    fn blank_province_is_omitted() {
        let prompt = build_tax_strategy_prompt(&business(), &[], Some("  "));
        assert!(!prompt.contains("Province"));
    }

    #[test]
    fn investment_prompt_marks_unavailable_rrsp() {
        let table = ConstantTable::for_year(2024).unwrap();
        let profile = InvestmentProfile {
            amount: dec!(10000),
            rrsp_room: dec!(0),
            current_income: IncomeBracket::From100KTo200K,
            retirement_income: IncomeBracket::From50KTo100K,
            years: 10,
        };
        let comparison = InvestmentComparator::new(&table)
            .unwrap()
            .compare(&profile)
            .unwrap();

        let prompt = build_investment_prompt(&profile, &comparison, None);

        assert!(prompt.contains("Current income: $100-200K"));
        assert!(prompt.contains("- RRSP: Not Available (No RRSP contribution room available)"));
        assert!(prompt.contains("1. Optimal strategy"));
    }
}
