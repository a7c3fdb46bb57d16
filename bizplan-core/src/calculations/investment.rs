//! Where to hold surplus cash: inside the corporation, personally, or in an
//! RRSP.
//!
//! All three vehicles compound at the same assumed annual return and differ
//! only in when and how the growth is taxed:
//!
//! - **Corporate**: half of the growth is taxed at the passive-investment
//!   rate, a refundable share comes back on payout, and the whole balance is
//!   then taxed as a dividend at the retirement-income rate.
//! - **Personal**: the principal is first extracted as a dividend at the
//!   current-income rate; half of the growth is later taxed at the
//!   retirement marginal rate.
//! - **RRSP**: the contribution (capped at room) earns a refund at the
//!   current-income rate, which is invested personally. The registered
//!   withdrawal is fully taxed at the retirement marginal rate.
//!
//! Available vehicles are ranked by after-tax cash, highest first.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{
    ensure_within_max, growth_factor, percent_of, round_half_up, round_percent,
};
use crate::calculations::format::format_currency;
use crate::error::PlannerError;
use crate::models::{ConstantTable, IncomeBracket, InvestmentConstants};

/// Longest horizon the comparator accepts.
pub const MAX_YEARS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentProfile {
    pub amount: Decimal,
    pub rrsp_room: Decimal,
    pub current_income: IncomeBracket,
    pub retirement_income: IncomeBracket,
    pub years: u32,
}

impl InvestmentProfile {
    pub fn validate(&self) -> Result<(), PlannerError> {
        ensure_within_max("amount", self.amount)?;
        ensure_within_max("rrspRoom", self.rrsp_room)?;
        if self.amount <= Decimal::ZERO {
            return Err(PlannerError::validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.rrsp_room < Decimal::ZERO {
            return Err(PlannerError::validation(format!(
                "rrspRoom must not be negative, got {}",
                self.rrsp_room
            )));
        }
        if self.years == 0 || self.years > MAX_YEARS {
            return Err(PlannerError::validation(format!(
                "years must be between 1 and {MAX_YEARS}, got {}",
                self.years
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentVehicle {
    Corporate,
    Personal,
    Rrsp,
}

impl InvestmentVehicle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Corporate => "Corporate Investment",
            Self::Personal => "Personal Investment",
            Self::Rrsp => "RRSP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComponent {
    pub label: String,
    /// Negative for refunds.
    pub amount: Decimal,
}

impl TaxComponent {
    fn new(
        label: &str,
        amount: Decimal,
    ) -> Self {
        Self {
            label: label.to_string(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleOutcome {
    pub vehicle: InvestmentVehicle,
    pub initial_investment: Decimal,
    pub final_value: Decimal,
    pub total_gains: Decimal,
    pub tax_components: Vec<TaxComponent>,
    pub total_tax: Decimal,
    pub after_tax_cash: Decimal,
    /// Total tax over total gains, in percent. `None` when there were no gains.
    pub effective_tax_rate: Option<Decimal>,
}

impl VehicleOutcome {
    fn new(
        vehicle: InvestmentVehicle,
        initial_investment: Decimal,
        final_value: Decimal,
        total_gains: Decimal,
        tax_components: Vec<TaxComponent>,
    ) -> Self {
        let total_tax: Decimal = tax_components.iter().map(|c| c.amount).sum();
        let effective_tax_rate = if total_gains > Decimal::ZERO {
            percent_of(total_tax, total_gains).map(round_percent)
        } else {
            None
        };
        Self {
            vehicle,
            initial_investment,
            final_value,
            total_gains,
            tax_components,
            total_tax,
            after_tax_cash: final_value - total_tax,
            effective_tax_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleResult {
    Available(VehicleOutcome),
    NotApplicable {
        vehicle: InvestmentVehicle,
        reason: String,
    },
}

impl VehicleResult {
    pub fn vehicle(&self) -> InvestmentVehicle {
        match self {
            Self::Available(outcome) => outcome.vehicle,
            Self::NotApplicable { vehicle, .. } => *vehicle,
        }
    }

    pub fn outcome(&self) -> Option<&VehicleOutcome> {
        match self {
            Self::Available(outcome) => Some(outcome),
            Self::NotApplicable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedVehicle {
    /// 1-based.
    pub rank: usize,
    pub vehicle: InvestmentVehicle,
    pub after_tax_cash: Decimal,
    /// Cash below the top-ranked vehicle; zero for the top entry.
    pub shortfall: Decimal,
    pub is_optimal: bool,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentComparison {
    pub results: Vec<VehicleResult>,
    pub ranking: Vec<RankedVehicle>,
}

impl InvestmentComparison {
    pub fn best(&self) -> Option<&RankedVehicle> {
        self.ranking.first()
    }
}

#[derive(Debug, Clone)]
pub struct InvestmentComparator<'a> {
    constants: &'a InvestmentConstants,
}

impl<'a> InvestmentComparator<'a> {
    pub fn new(table: &'a ConstantTable) -> Result<Self, PlannerError> {
        table.validate()?;
        Ok(Self {
            constants: &table.investment,
        })
    }

    pub fn compare(
        &self,
        profile: &InvestmentProfile,
    ) -> Result<InvestmentComparison, PlannerError> {
        profile.validate()?;

        let results = vec![
            VehicleResult::Available(self.corporate(profile)),
            VehicleResult::Available(self.personal(profile)),
            self.rrsp(profile),
        ];
        let ranking = rank_vehicles(&results);

        Ok(InvestmentComparison { results, ranking })
    }

    fn growth(
        &self,
        years: u32,
    ) -> Decimal {
        growth_factor(self.constants.annual_return, years)
    }

    fn corporate(
        &self,
        profile: &InvestmentProfile,
    ) -> VehicleOutcome {
        let c = self.constants;
        let final_value = round_half_up(profile.amount * self.growth(profile.years));
        let gains = final_value - profile.amount;

        let taxable = round_half_up(gains * c.capital_gains_inclusion);
        let passive_tax = round_half_up(taxable * c.passive_investment_rate);
        let refund = round_half_up(taxable * c.refundable_rate).min(passive_tax);

        let distributed = final_value - passive_tax + refund;
        let dividend_rate = c.dividend_rates.rate_for(profile.retirement_income);
        let dividend_tax = round_half_up(distributed * dividend_rate);

        VehicleOutcome::new(
            InvestmentVehicle::Corporate,
            profile.amount,
            final_value,
            gains,
            vec![
                TaxComponent::new("Corporate passive investment tax", passive_tax),
                TaxComponent::new("Refundable dividend tax on hand", -refund),
                TaxComponent::new("Personal dividend tax on distribution", dividend_tax),
            ],
        )
    }

    fn personal(
        &self,
        profile: &InvestmentProfile,
    ) -> VehicleOutcome {
        let c = self.constants;
        let extraction_rate = c.dividend_rates.rate_for(profile.current_income);
        let extraction_tax = round_half_up(profile.amount * extraction_rate);
        let invested = profile.amount - extraction_tax;

        let final_value = round_half_up(invested * self.growth(profile.years));
        let gains = final_value - invested;
        let marginal = c.marginal_rates.rate_for(profile.retirement_income);
        let capital_gains_tax = round_half_up(gains * c.capital_gains_inclusion * marginal);

        VehicleOutcome::new(
            InvestmentVehicle::Personal,
            profile.amount,
            final_value,
            gains,
            vec![
                TaxComponent::new("Dividend tax on extraction", extraction_tax),
                TaxComponent::new("Capital gains tax", capital_gains_tax),
            ],
        )
    }

    fn rrsp(
        &self,
        profile: &InvestmentProfile,
    ) -> VehicleResult {
        if profile.rrsp_room <= Decimal::ZERO {
            return VehicleResult::NotApplicable {
                vehicle: InvestmentVehicle::Rrsp,
                reason: "No RRSP contribution room available".to_string(),
            };
        }

        let c = self.constants;
        let growth = self.growth(profile.years);
        let contribution = profile.amount.min(profile.rrsp_room);

        let refund = round_half_up(
            contribution * c.rrsp_refund_rates.rate_for(profile.current_income),
        );
        let registered_value = round_half_up(contribution * growth);
        let refund_value = round_half_up(refund * growth);
        let refund_gains = refund_value - refund;

        let marginal = c.marginal_rates.rate_for(profile.retirement_income);
        let withdrawal_tax = round_half_up(registered_value * marginal);
        let refund_gains_tax = round_half_up(refund_gains * c.capital_gains_inclusion * marginal);

        let gains = (registered_value - contribution) + refund_gains;

        VehicleResult::Available(VehicleOutcome::new(
            InvestmentVehicle::Rrsp,
            contribution,
            registered_value + refund_value,
            gains,
            vec![
                TaxComponent::new("Tax on RRSP withdrawal", withdrawal_tax),
                TaxComponent::new("Capital gains tax on invested refund", refund_gains_tax),
            ],
        ))
    }
}

/// Orders available vehicles by after-tax cash, highest first, and annotates
/// each with how it compares to the leader. Ties keep their input order.
pub fn rank_vehicles(results: &[VehicleResult]) -> Vec<RankedVehicle> {
    let mut available: Vec<&VehicleOutcome> =
        results.iter().filter_map(VehicleResult::outcome).collect();
    available.sort_by(|a, b| b.after_tax_cash.cmp(&a.after_tax_cash));

    let Some(leader) = available.first().copied() else {
        return Vec::new();
    };

    available
        .iter()
        .enumerate()
        .map(|(index, outcome)| {
            let shortfall = leader.after_tax_cash - outcome.after_tax_cash;
            let is_optimal = index == 0;
            let recommendation = if is_optimal {
                format!(
                    "Optimal strategy: highest after-tax cash of {}",
                    format_currency(outcome.after_tax_cash)
                )
            } else {
                format!(
                    "{} less after-tax cash than {}",
                    format_currency(shortfall),
                    leader.vehicle.name()
                )
            };
            RankedVehicle {
                rank: index + 1,
                vehicle: outcome.vehicle,
                after_tax_cash: outcome.after_tax_cash,
                shortfall,
                is_optimal,
                recommendation,
            }
        })
        .collect()
}
