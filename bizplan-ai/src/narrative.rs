//! Narrative text layered over the calculated results.
//!
//! Generated text is decorative. When the provider fails, or its reply
//! cannot be parsed, every field falls back to fixed copy so the numbers
//! are always delivered.

use serde::{Deserialize, Serialize};
use tracing::warn;

use bizplan_core::calculations::format::format_currency;
use bizplan_core::calculations::{
    BusinessProfile, InvestmentComparison, InvestmentProfile, SalaryDividendStrategy,
};

use crate::category::PromptCategory;
use crate::client::TextGenerator;
use crate::extract::parse_lenient;
use crate::prompt::{build_investment_prompt, build_tax_strategy_prompt};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInsight {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

impl StrategyInsight {
    fn new(
        summary: &str,
        pros: &[&str],
        cons: &[&str],
    ) -> Self {
        Self {
            summary: summary.to_string(),
            pros: pros.iter().map(|s| s.to_string()).collect(),
            cons: cons.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fixed copy for a strategy, keyed by its display name.
    pub fn fallback(strategy_name: &str) -> Self {
        match strategy_name {
            "100% Salary" => Self::new(
                "Paying everything as salary maximizes RRSP room and CPP credits.",
                &[
                    "Creates the most RRSP contribution room",
                    "Builds CPP retirement benefits",
                    "Salary is deductible to the corporation",
                ],
                &[
                    "Highest payroll cost with CPP and EI on both sides",
                    "Salary is taxed at full personal rates",
                ],
            ),
            "100% Dividend" => Self::new(
                "Paying everything as dividends avoids payroll contributions entirely.",
                &[
                    "No CPP or EI premiums",
                    "Simple to administer with no payroll remittances",
                ],
                &[
                    "Creates no RRSP contribution room",
                    "No CPP retirement benefits accrue",
                    "Corporate tax is paid before the dividend",
                ],
            ),
            "50/50 Split" => Self::new(
                "An even split balances payroll cost against retirement savings room.",
                &[
                    "Builds some RRSP room and CPP benefits",
                    "Lower payroll cost than all salary",
                ],
                &["Requires both payroll and dividend paperwork"],
            ),
            "65/35 Split" => Self::new(
                "A salary-weighted split keeps most of the RRSP and CPP advantages.",
                &[
                    "Substantial RRSP room",
                    "Dividend portion trims payroll contributions",
                ],
                &["Requires both payroll and dividend paperwork"],
            ),
            _ => Self::new(
                "Compare net income and total tax against the other strategies.",
                &[],
                &[],
            ),
        }
    }

    fn or_fallback(
        self,
        fallback: StrategyInsight,
    ) -> StrategyInsight {
        StrategyInsight {
            summary: if self.summary.trim().is_empty() {
                fallback.summary
            } else {
                self.summary
            },
            pros: if self.pros.is_empty() { fallback.pros } else { self.pros },
            cons: if self.cons.is_empty() { fallback.cons } else { self.cons },
        }
    }
}

/// Pairs generated insights with strategies by position. Missing entries, and
/// empty fields within an entry, take the strategy's fallback; extras are
/// dropped.
pub fn merge_insights(
    strategy_names: &[&str],
    generated: Vec<StrategyInsight>,
) -> Vec<StrategyInsight> {
    let mut generated = generated.into_iter();
    strategy_names
        .iter()
        .map(|name| {
            let fallback = StrategyInsight::fallback(name);
            match generated.next() {
                Some(insight) => insight.or_fallback(fallback),
                None => fallback,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxNarrative {
    pub recommendation: String,
    pub insights: Vec<StrategyInsight>,
    /// False when any part came from fallback copy.
    pub generated: bool,
}

#[derive(Deserialize)]
struct TaxReply {
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    strategies: Vec<StrategyInsight>,
}

fn fallback_recommendation(strategies: &[SalaryDividendStrategy]) -> String {
    match strategies.iter().max_by(|a, b| a.net_income.cmp(&b.net_income)) {
        Some(best) => format!(
            "{} leaves the most cash in hand at {} after personal tax. Weigh that against \
             RRSP room and CPP benefits, and confirm the plan with an accountant.",
            best.name,
            format_currency(best.net_income)
        ),
        None => "Review each strategy with an accountant before choosing.".to_string(),
    }
}

pub async fn narrate_tax_strategies(
    generator: &dyn TextGenerator,
    profile: &BusinessProfile,
    strategies: &[SalaryDividendStrategy],
    province: Option<&str>,
) -> TaxNarrative {
    let names: Vec<&str> = strategies.iter().map(|s| s.name.as_str()).collect();
    let prompt = build_tax_strategy_prompt(profile, strategies, province);

    let reply = generator
        .generate(&prompt, PromptCategory::TaxStrategy)
        .await
        .into_content()
        .and_then(|content| parse_lenient::<TaxReply>(&content));

    match reply {
        Ok(reply) => {
            let complete = reply.strategies.len() >= names.len();
            let recommendation = reply
                .recommendation
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());
            let generated = complete && recommendation.is_some();
            TaxNarrative {
                recommendation: recommendation
                    .unwrap_or_else(|| fallback_recommendation(strategies)),
                insights: merge_insights(&names, reply.strategies),
                generated,
            }
        }
        Err(e) => {
            warn!(provider = generator.provider_name(), error = %e, "tax narrative fell back");
            TaxNarrative {
                recommendation: fallback_recommendation(strategies),
                insights: merge_insights(&names, Vec::new()),
                generated: false,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentNarrative {
    pub summary: String,
    pub considerations: Vec<String>,
    pub generated: bool,
}

#[derive(Deserialize)]
struct InvestmentReply {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    considerations: Vec<String>,
}

const FALLBACK_CONSIDERATIONS: [&str; 4] = [
    "Returns are assumed constant; actual market returns will vary.",
    "Tax rates and brackets may change before the funds are withdrawn.",
    "Corporate investment income can reduce access to the small-business rate.",
    "RRSP withdrawals are fully taxable and may affect income-tested benefits.",
];

fn fallback_summary(
    profile: &InvestmentProfile,
    comparison: &InvestmentComparison,
) -> String {
    match comparison.best() {
        Some(best) => format!(
            "Over {} years, {} produces the highest after-tax cash at {}.",
            profile.years,
            best.vehicle.name(),
            format_currency(best.after_tax_cash)
        ),
        None => "No investment vehicle was available for these inputs.".to_string(),
    }
}

fn fallback_considerations() -> Vec<String> {
    FALLBACK_CONSIDERATIONS.iter().map(|s| s.to_string()).collect()
}

pub async fn narrate_investment(
    generator: &dyn TextGenerator,
    profile: &InvestmentProfile,
    comparison: &InvestmentComparison,
    province: Option<&str>,
) -> InvestmentNarrative {
    let prompt = build_investment_prompt(profile, comparison, province);

    let reply = generator
        .generate(&prompt, PromptCategory::Investment)
        .await
        .into_content()
        .and_then(|content| parse_lenient::<InvestmentReply>(&content));

    match reply {
        Ok(reply) => {
            let summary = reply.summary.trim().to_string();
            let considerations: Vec<String> = reply
                .considerations
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            let generated = !summary.is_empty() && !considerations.is_empty();
            InvestmentNarrative {
                summary: if summary.is_empty() {
                    fallback_summary(profile, comparison)
                } else {
                    summary
                },
                considerations: if considerations.is_empty() {
                    fallback_considerations()
                } else {
                    considerations
                },
                generated,
            }
        }
        Err(e) => {
            warn!(provider = generator.provider_name(), error = %e, "investment narrative fell back");
            InvestmentNarrative {
                summary: fallback_summary(profile, comparison),
                considerations: fallback_considerations(),
                generated: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bizplan_core::calculations::{InvestmentComparator, SalaryDividendComparator};
    use bizplan_core::{ConstantTable, IncomeBracket};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::client::{ChatMessage, DisabledGenerator};
    use crate::error::GenerationError;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn provider_name(&self) -> &'static str {
            "canned"
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _category: PromptCategory,
        ) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    fn business() -> BusinessProfile {
        BusinessProfile {
            revenue: dec!(200000),
            expenses_percentage: dec!(30),
            withdrawal_amount: dec!(100000),
        }
    }

    fn strategies() -> Vec<SalaryDividendStrategy> {
        let table = ConstantTable::for_year(2024).unwrap();
        SalaryDividendComparator::new(&table)
            .unwrap()
            .compare(&business())
            .unwrap()
    }

    fn investment() -> (InvestmentProfile, InvestmentComparison) {
        let table = ConstantTable::for_year(2024).unwrap();
        let profile = InvestmentProfile {
            amount: dec!(10000),
            rrsp_room: dec!(5000),
            current_income: IncomeBracket::From100KTo200K,
            retirement_income: IncomeBracket::From50KTo100K,
            years: 10,
        };
        let comparison = InvestmentComparator::new(&table)
            .unwrap()
            .compare(&profile)
            .unwrap();
        (profile, comparison)
    }

    #[test]
    fn merge_fills_missing_positions_with_fallbacks() {
        let names = ["100% Salary", "100% Dividend", "50/50 Split"];
        let generated = vec![StrategyInsight::new("Generated", &["a"], &["b"])];

        let merged = merge_insights(&names, generated);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], StrategyInsight::new("Generated", &["a"], &["b"]));
        assert_eq!(merged[1], StrategyInsight::fallback("100% Dividend"));
        assert_eq!(merged[2], StrategyInsight::fallback("50/50 Split"));
    }

    #[test]
    fn merge_fills_empty_fields_and_drops_extras() {
        let names = ["100% Salary"];
        let generated = vec![
            StrategyInsight::new("  ", &["kept"], &[]),
            StrategyInsight::new("extra", &[], &[]),
        ];

        let merged = merge_insights(&names, generated);
        let fallback = StrategyInsight::fallback("100% Salary");

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].summary, fallback.summary);
        assert_eq!(merged[0].pros, vec!["kept".to_string()]);
        assert_eq!(merged[0].cons, fallback.cons);
    }

    #[tokio::test]
    async fn disabled_provider_yields_full_fallback() {
        let strategies = strategies();

        let narrative =
            narrate_tax_strategies(&DisabledGenerator, &business(), &strategies, None).await;

        assert!(!narrative.generated);
        assert_eq!(narrative.insights.len(), 4);
        assert_eq!(narrative.insights[1], StrategyInsight::fallback("100% Dividend"));
        assert!(narrative.recommendation.contains("leaves the most cash in hand"));
    }

    #[tokio::test]
    async fn wrapped_reply_is_extracted_and_merged() {
        let generator = CannedGenerator(
            "Sure!\n```json\n{\"recommendation\": \"Take a blend.\", \"strategies\": [{\"summary\": \"Salary builds room.\", \"pros\": [\"RRSP\"], \"cons\": [\"Payroll\"]}]}\n```",
        );
        let strategies = strategies();

        let narrative =
            narrate_tax_strategies(&generator, &business(), &strategies, Some("ON")).await;

        assert_eq!(narrative.recommendation, "Take a blend.");
        assert_eq!(narrative.insights[0].summary, "Salary builds room.");
        assert_eq!(narrative.insights[3], StrategyInsight::fallback("65/35 Split"));
        assert!(!narrative.generated);
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back() {
        let generator = CannedGenerator("I am unable to provide tax advice.");
        let strategies = strategies();

        let narrative = narrate_tax_strategies(&generator, &business(), &strategies, None).await;

        assert_eq!(narrative.recommendation, fallback_recommendation(&strategies));
    }

    #[tokio::test]
    async fn investment_reply_is_used_when_complete() {
        let generator = CannedGenerator(
            r#"{"summary": "The RRSP wins.", "considerations": ["Mind the room", " "]}"#,
        );
        let (profile, comparison) = investment();

        let narrative = narrate_investment(&generator, &profile, &comparison, None).await;

        assert!(narrative.generated);
        assert_eq!(narrative.summary, "The RRSP wins.");
        assert_eq!(narrative.considerations, vec!["Mind the room".to_string()]);
    }

    #[tokio::test]
    async fn investment_fallback_names_best_vehicle() {
        let (profile, comparison) = investment();
        let best = comparison.best().unwrap().vehicle.name();

        let narrative = narrate_investment(&DisabledGenerator, &profile, &comparison, None).await;

        assert!(!narrative.generated);
        assert!(narrative.summary.contains(best));
        assert!(narrative.summary.starts_with("Over 10 years"));
        assert_eq!(narrative.considerations.len(), FALLBACK_CONSIDERATIONS.len());
    }
}
