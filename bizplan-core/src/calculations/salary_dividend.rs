//! Salary versus dividend withdrawal strategies for an owner-managed
//! corporation.
//!
//! For a given split of the owner's withdrawal, the comparator computes:
//!
//! | Layer     | Amount |
//! |-----------|--------|
//! | Personal  | Income tax on salary, dividend tax stacked on salary, employee CPP and EI |
//! | Payroll   | Employer CPP (equal to employee) and employer EI |
//! | Corporate | Small-business tax on income left after salary and employer payroll |
//!
//! Net cash is the withdrawal minus the personal layer. The effective rate
//! is the personal layer over the withdrawal. Retained earnings are what the
//! corporation keeps after tax and after paying the dividend.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use bizplan_core::ConstantTable;
//! use bizplan_core::calculations::{BusinessProfile, SalaryDividendComparator};
//!
//! let table = ConstantTable::for_year(2024).unwrap();
//! let comparator = SalaryDividendComparator::new(&table).unwrap();
//! let profile = BusinessProfile {
//!     revenue: dec!(200000),
//!     expenses_percentage: dec!(30),
//!     withdrawal_amount: dec!(100000),
//! };
//!
//! let strategies = comparator.compare(&profile).unwrap();
//!
//! assert_eq!(strategies.len(), 4);
//! assert_eq!(strategies[0].name, "100% Salary");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{ensure_within_max, max, percent_of, round_half_up, round_percent};
use crate::calculations::dividend::calculate_dividend_tax;
use crate::calculations::payroll::{calculate_cpp, calculate_ei};
use crate::calculations::ProgressiveTaxSchedule;
use crate::error::PlannerError;
use crate::models::ConstantTable;

/// What the business earns and what the owner wants to take out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub revenue: Decimal,
    /// Expenses as a percentage of revenue, `0..=100`.
    pub expenses_percentage: Decimal,
    pub withdrawal_amount: Decimal,
}

impl BusinessProfile {
    /// # Errors
    ///
    /// [`PlannerError::Validation`] for negative amounts, amounts above
    /// [`MAX_AMOUNT`](crate::calculations::common::MAX_AMOUNT), or an expense
    /// percentage outside `0..=100`.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.revenue < Decimal::ZERO {
            return Err(PlannerError::validation(format!(
                "revenue must not be negative, got {}",
                self.revenue
            )));
        }
        if self.expenses_percentage < Decimal::ZERO
            || self.expenses_percentage > Decimal::ONE_HUNDRED
        {
            return Err(PlannerError::validation(format!(
                "expensesPercentage must be between 0 and 100, got {}",
                self.expenses_percentage
            )));
        }
        if self.withdrawal_amount < Decimal::ZERO {
            return Err(PlannerError::validation(format!(
                "withdrawalAmount must not be negative, got {}",
                self.withdrawal_amount
            )));
        }
        ensure_within_max("revenue", self.revenue)?;
        ensure_within_max("withdrawalAmount", self.withdrawal_amount)?;
        Ok(())
    }

    pub fn net_business_income(&self) -> Decimal {
        round_half_up(
            self.revenue * (Decimal::ONE_HUNDRED - self.expenses_percentage)
                / Decimal::ONE_HUNDRED,
        )
    }
}

/// One fixed way of splitting the withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitScenario {
    pub name: &'static str,
    /// Share of the withdrawal paid as salary, in whole percent.
    pub salary_percent: u32,
}

impl SplitScenario {
    pub fn salary_share(&self) -> Decimal {
        Decimal::from(self.salary_percent) / Decimal::ONE_HUNDRED
    }
}

/// The four splits every comparison reports, in display order.
pub const STANDARD_SCENARIOS: [SplitScenario; 4] = [
    SplitScenario {
        name: "100% Salary",
        salary_percent: 100,
    },
    SplitScenario {
        name: "100% Dividend",
        salary_percent: 0,
    },
    SplitScenario {
        name: "50/50 Split",
        salary_percent: 50,
    },
    SplitScenario {
        name: "65/35 Split",
        salary_percent: 65,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalTaxBreakdown {
    pub income_tax: Decimal,
    pub dividend_tax: Decimal,
    pub cpp: Decimal,
    pub ei: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryDividendStrategy {
    pub name: String,
    pub withdrawal_amount: Decimal,
    pub salary: Decimal,
    pub dividend: Decimal,
    pub personal_tax: PersonalTaxBreakdown,
    pub employer_cpp: Decimal,
    pub employer_ei: Decimal,
    pub corporate_income: Decimal,
    pub corporate_tax: Decimal,
    /// Personal, payroll (both sides) and corporate tax combined.
    pub total_tax: Decimal,
    pub net_income: Decimal,
    /// Personal layer as a percentage of the withdrawal.
    pub effective_tax_rate: Decimal,
    pub rrsp_room: Decimal,
    pub retained_earnings: Decimal,
}

/// Evaluates withdrawal splits against one constant table.
#[derive(Debug, Clone)]
pub struct SalaryDividendComparator<'a> {
    table: &'a ConstantTable,
    schedule: ProgressiveTaxSchedule<'a>,
}

impl<'a> SalaryDividendComparator<'a> {
    /// # Errors
    ///
    /// [`PlannerError::Internal`] when the table or its brackets are malformed.
    pub fn new(table: &'a ConstantTable) -> Result<Self, PlannerError> {
        table.validate()?;
        let schedule = ProgressiveTaxSchedule::new(&table.personal_brackets)?;
        Ok(Self { table, schedule })
    }

    /// Evaluates the four [`STANDARD_SCENARIOS`] in order.
    pub fn compare(
        &self,
        profile: &BusinessProfile,
    ) -> Result<Vec<SalaryDividendStrategy>, PlannerError> {
        profile.validate()?;
        Ok(STANDARD_SCENARIOS
            .iter()
            .map(|scenario| self.evaluate(profile, scenario))
            .collect())
    }

    pub fn evaluate(
        &self,
        profile: &BusinessProfile,
        scenario: &SplitScenario,
    ) -> SalaryDividendStrategy {
        let withdrawal = profile.withdrawal_amount;
        let salary = round_half_up(withdrawal * scenario.salary_share());
        let dividend = withdrawal - salary;

        let cpp = calculate_cpp(salary, &self.table.cpp);
        let ei = calculate_ei(salary, &self.table.ei);

        let income_tax = self.schedule.calculate(salary);
        let dividend_tax =
            calculate_dividend_tax(dividend, salary, &self.schedule, &self.table.dividend).tax;

        let personal_total = income_tax + dividend_tax + cpp.employee + ei.employee;
        let personal_tax = PersonalTaxBreakdown {
            income_tax,
            dividend_tax,
            cpp: cpp.employee,
            ei: ei.employee,
            total: personal_total,
        };

        let corporate_income =
            profile.net_business_income() - salary - cpp.employer - ei.employer;
        if corporate_income < Decimal::ZERO {
            warn!(
                scenario = scenario.name,
                corporate_income = %corporate_income,
                "Salary and employer payroll exceed net business income; corporate tax will be zero"
            );
        }
        let corporate_tax = round_half_up(
            max(corporate_income, Decimal::ZERO) * self.table.corporate.small_business_rate,
        );
        let after_tax_corporate = corporate_income - corporate_tax;
        let retained_earnings = max(after_tax_corporate - dividend, Decimal::ZERO);

        let total_tax = personal_total + cpp.employer + ei.employer + corporate_tax;
        let net_income = withdrawal - personal_total;
        let effective_tax_rate = percent_of(personal_total, withdrawal)
            .map(round_percent)
            .unwrap_or(Decimal::ZERO);
        let rrsp_room = round_half_up(salary * self.table.rrsp.room_rate)
            .min(self.table.rrsp.annual_limit);

        SalaryDividendStrategy {
            name: scenario.name.to_string(),
            withdrawal_amount: withdrawal,
            salary,
            dividend,
            personal_tax,
            employer_cpp: cpp.employer,
            employer_ei: ei.employer,
            corporate_income,
            corporate_tax,
            total_tax,
            net_income,
            effective_tax_rate,
            rrsp_room,
            retained_earnings,
        }
    }
}
