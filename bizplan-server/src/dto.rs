//! Wire shapes for the HTTP API. Requests carry raw numbers; responses carry
//! display-ready strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bizplan_ai::{ChatMessage, PromptCategory, StrategyInsight};
use bizplan_core::calculations::format::{
    NOT_APPLICABLE, NOT_AVAILABLE, format_currency, format_optional_percent, format_percent,
};
use bizplan_core::calculations::{RankedVehicle, SalaryDividendStrategy, VehicleResult};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxStrategyRequest {
    pub revenue: Decimal,
    pub expenses_percentage: Decimal,
    pub withdrawal_amount: Decimal,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRequest {
    pub amount: Decimal,
    pub rrsp_room: Decimal,
    pub current_income: String,
    pub retirement_income: String,
    pub years: u32,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub category: Option<PromptCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyView {
    pub name: String,
    pub withdrawal_amount: String,
    pub salary: String,
    pub dividend: String,
    pub income_tax: String,
    pub dividend_tax: String,
    pub cpp: String,
    pub ei: String,
    pub personal_tax: String,
    pub employer_cpp: String,
    pub employer_ei: String,
    pub corporate_tax: String,
    pub total_tax: String,
    pub net_income: String,
    pub effective_tax_rate: String,
    pub rrsp_room: String,
    pub retained_earnings: String,
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl StrategyView {
    pub fn new(
        strategy: &SalaryDividendStrategy,
        insight: StrategyInsight,
    ) -> Self {
        Self {
            name: strategy.name.clone(),
            withdrawal_amount: format_currency(strategy.withdrawal_amount),
            salary: format_currency(strategy.salary),
            dividend: format_currency(strategy.dividend),
            income_tax: format_currency(strategy.personal_tax.income_tax),
            dividend_tax: format_currency(strategy.personal_tax.dividend_tax),
            cpp: format_currency(strategy.personal_tax.cpp),
            ei: format_currency(strategy.personal_tax.ei),
            personal_tax: format_currency(strategy.personal_tax.total),
            employer_cpp: format_currency(strategy.employer_cpp),
            employer_ei: format_currency(strategy.employer_ei),
            corporate_tax: format_currency(strategy.corporate_tax),
            total_tax: format_currency(strategy.total_tax),
            net_income: format_currency(strategy.net_income),
            effective_tax_rate: format_percent(strategy.effective_tax_rate),
            rrsp_room: format_currency(strategy.rrsp_room),
            retained_earnings: format_currency(strategy.retained_earnings),
            summary: insight.summary,
            pros: insight.pros,
            cons: insight.cons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxStrategyData {
    pub sequence: i64,
    pub strategies: Vec<StrategyView>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLineView {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub initial_investment: String,
    pub final_value: String,
    pub tax_breakdown: Vec<TaxLineView>,
    pub total_tax: String,
    pub after_tax_cash: String,
    pub effective_tax_rate: String,
}

impl From<&VehicleResult> for VehicleView {
    fn from(result: &VehicleResult) -> Self {
        match result {
            VehicleResult::Available(o) => Self {
                name: o.vehicle.name().to_string(),
                available: true,
                note: None,
                initial_investment: format_currency(o.initial_investment),
                final_value: format_currency(o.final_value),
                tax_breakdown: o
                    .tax_components
                    .iter()
                    .map(|c| TaxLineView {
                        label: c.label.clone(),
                        amount: format_currency(c.amount),
                    })
                    .collect(),
                total_tax: format_currency(o.total_tax),
                after_tax_cash: format_currency(o.after_tax_cash),
                effective_tax_rate: format_optional_percent(o.effective_tax_rate),
            },
            VehicleResult::NotApplicable { vehicle, reason } => Self {
                name: vehicle.name().to_string(),
                available: false,
                note: Some(reason.clone()),
                initial_investment: NOT_AVAILABLE.to_string(),
                final_value: NOT_AVAILABLE.to_string(),
                tax_breakdown: Vec::new(),
                total_tax: NOT_AVAILABLE.to_string(),
                after_tax_cash: NOT_AVAILABLE.to_string(),
                effective_tax_rate: NOT_APPLICABLE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub rank: usize,
    pub name: String,
    pub after_tax_cash: String,
    pub difference: String,
    pub is_optimal: bool,
    pub recommendation: String,
}

impl From<&RankedVehicle> for RankingView {
    fn from(ranked: &RankedVehicle) -> Self {
        Self {
            rank: ranked.rank,
            name: ranked.vehicle.name().to_string(),
            after_tax_cash: format_currency(ranked.after_tax_cash),
            difference: format_currency(ranked.shortfall),
            is_optimal: ranked.is_optimal,
            recommendation: ranked.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentData {
    pub sequence: i64,
    pub strategies: Vec<VehicleView>,
    pub ranking: Vec<RankingView>,
    pub summary: String,
    pub considerations: Vec<String>,
}
