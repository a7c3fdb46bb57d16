//! Year-specific constants for the tax engine and the investment comparator.
//!
//! A [`ConstantTable`] is built once at startup (see [`ConstantTable::for_year`])
//! and shared read-only for the life of the process.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::models::{IncomeRateTable, TaxBracket};

/// Canada Pension Plan limits and rates (employee side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppConstants {
    pub basic_exemption: Decimal,
    /// Year's Maximum Pensionable Earnings.
    pub ympe: Decimal,
    /// Year's Additional Maximum Pensionable Earnings (CPP2 ceiling).
    pub yampe: Decimal,
    pub employee_rate: Decimal,
    pub cpp2_rate: Decimal,
}

/// Employment Insurance limits and rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EiConstants {
    /// Maximum Insurable Earnings.
    pub max_insurable_earnings: Decimal,
    pub employee_rate: Decimal,
    /// Employer premium as a multiple of the employee premium.
    pub employer_multiplier: Decimal,
}

/// Non-eligible dividend gross-up and credits, both as fractions of the
/// grossed-up amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendConstants {
    pub gross_up_rate: Decimal,
    pub federal_credit_rate: Decimal,
    pub provincial_credit_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateConstants {
    pub small_business_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrspConstants {
    /// Share of salary that becomes contribution room.
    pub room_rate: Decimal,
    pub annual_limit: Decimal,
}

/// Assumptions used by the investment comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentConstants {
    pub annual_return: Decimal,
    pub capital_gains_inclusion: Decimal,
    pub passive_investment_rate: Decimal,
    /// Refundable share of taxable passive income, returned on dividend payout.
    pub refundable_rate: Decimal,
    pub dividend_rates: IncomeRateTable,
    pub marginal_rates: IncomeRateTable,
    pub rrsp_refund_rates: IncomeRateTable,
}

/// Every constant the planner needs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantTable {
    pub tax_year: i32,
    /// Combined federal and provincial personal schedule.
    pub personal_brackets: Vec<TaxBracket>,
    pub cpp: CppConstants,
    pub ei: EiConstants,
    pub dividend: DividendConstants,
    pub corporate: CorporateConstants,
    pub rrsp: RrspConstants,
    pub investment: InvestmentConstants,
}

impl ConstantTable {
    /// Tax years with a built-in table.
    pub const SUPPORTED_YEARS: [i32; 1] = [2024];

    /// Returns the built-in table for `tax_year`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Validation`] when no table exists for the year.
    pub fn for_year(tax_year: i32) -> Result<Self, PlannerError> {
        match tax_year {
            2024 => Ok(Self::ontario_2024()),
            other => Err(PlannerError::validation(format!(
                "no constant table for tax year {other}; supported: {:?}",
                Self::SUPPORTED_YEARS
            ))),
        }
    }

    fn ontario_2024() -> Self {
        Self {
            tax_year: 2024,
            personal_brackets: vec![
                TaxBracket::bounded(dec!(0), dec!(51446), dec!(0.2005)),
                TaxBracket::bounded(dec!(51447), dec!(55867), dec!(0.2415)),
                TaxBracket::bounded(dec!(55868), dec!(102894), dec!(0.2965)),
                TaxBracket::bounded(dec!(102895), dec!(111733), dec!(0.3166)),
                TaxBracket::bounded(dec!(111734), dec!(150000), dec!(0.3716)),
                TaxBracket::bounded(dec!(150001), dec!(173205), dec!(0.3816)),
                TaxBracket::bounded(dec!(173206), dec!(220000), dec!(0.4116)),
                TaxBracket::bounded(dec!(220001), dec!(246752), dec!(0.4216)),
                TaxBracket::unbounded(dec!(246753), dec!(0.4616)),
            ],
            cpp: CppConstants {
                basic_exemption: dec!(3500),
                ympe: dec!(68500),
                yampe: dec!(73200),
                employee_rate: dec!(0.0595),
                cpp2_rate: dec!(0.04),
            },
            ei: EiConstants {
                max_insurable_earnings: dec!(63200),
                employee_rate: dec!(0.0166),
                employer_multiplier: dec!(1.4),
            },
            dividend: DividendConstants {
                gross_up_rate: dec!(0.15),
                federal_credit_rate: dec!(0.090301),
                provincial_credit_rate: dec!(0.029863),
            },
            corporate: CorporateConstants {
                small_business_rate: dec!(0.122),
            },
            rrsp: RrspConstants {
                room_rate: dec!(0.18),
                annual_limit: dec!(31560),
            },
            investment: InvestmentConstants {
                annual_return: dec!(0.06),
                capital_gains_inclusion: dec!(0.5),
                passive_investment_rate: dec!(0.5017),
                refundable_rate: dec!(0.3067),
                dividend_rates: IncomeRateTable {
                    under_50k: dec!(0.0924),
                    from_50k_to_100k: dec!(0.2538),
                    from_100k_to_200k: dec!(0.3800),
                    over_200k: dec!(0.4774),
                },
                marginal_rates: IncomeRateTable {
                    under_50k: dec!(0.2005),
                    from_50k_to_100k: dec!(0.2965),
                    from_100k_to_200k: dec!(0.4341),
                    over_200k: dec!(0.5353),
                },
                rrsp_refund_rates: IncomeRateTable {
                    under_50k: dec!(0.2005),
                    from_50k_to_100k: dec!(0.2965),
                    from_100k_to_200k: dec!(0.4341),
                    over_200k: dec!(0.5353),
                },
            },
        }
    }

    /// Checks every rate is a fraction and every ceiling is ordered.
    ///
    /// Bracket layout is checked separately by
    /// [`ProgressiveTaxSchedule::new`](crate::calculations::ProgressiveTaxSchedule::new).
    ///
    /// # Errors
    ///
    /// [`PlannerError::Internal`] naming the first offending constant.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let rates = [
            ("cpp.employee_rate", self.cpp.employee_rate),
            ("cpp.cpp2_rate", self.cpp.cpp2_rate),
            ("ei.employee_rate", self.ei.employee_rate),
            ("dividend.gross_up_rate", self.dividend.gross_up_rate),
            ("dividend.federal_credit_rate", self.dividend.federal_credit_rate),
            ("dividend.provincial_credit_rate", self.dividend.provincial_credit_rate),
            ("corporate.small_business_rate", self.corporate.small_business_rate),
            ("rrsp.room_rate", self.rrsp.room_rate),
            ("investment.capital_gains_inclusion", self.investment.capital_gains_inclusion),
            ("investment.passive_investment_rate", self.investment.passive_investment_rate),
            ("investment.refundable_rate", self.investment.refundable_rate),
        ];
        for (name, rate) in rates {
            check_fraction(name, rate)?;
        }

        let tables = [
            ("investment.dividend_rates", &self.investment.dividend_rates),
            ("investment.marginal_rates", &self.investment.marginal_rates),
            ("investment.rrsp_refund_rates", &self.investment.rrsp_refund_rates),
        ];
        for (name, table) in tables {
            for rate in table.rates() {
                check_fraction(name, rate)?;
            }
        }

        if self.cpp.ympe <= self.cpp.basic_exemption {
            return Err(PlannerError::internal(format!(
                "cpp.ympe ({}) must exceed the basic exemption ({})",
                self.cpp.ympe, self.cpp.basic_exemption
            )));
        }
        if self.cpp.yampe < self.cpp.ympe {
            return Err(PlannerError::internal(format!(
                "cpp.yampe ({}) must not be below ympe ({})",
                self.cpp.yampe, self.cpp.ympe
            )));
        }
        if self.ei.max_insurable_earnings <= Decimal::ZERO {
            return Err(PlannerError::internal(
                "ei.max_insurable_earnings must be positive",
            ));
        }
        if self.ei.employer_multiplier < Decimal::ZERO {
            return Err(PlannerError::internal(
                "ei.employer_multiplier must be non-negative",
            ));
        }
        if self.rrsp.annual_limit < Decimal::ZERO {
            return Err(PlannerError::internal("rrsp.annual_limit must be non-negative"));
        }
        if self.investment.annual_return <= dec!(-1) {
            return Err(PlannerError::internal(
                "investment.annual_return must be greater than -100%",
            ));
        }

        Ok(())
    }
}

fn check_fraction(
    name: &str,
    rate: Decimal,
) -> Result<(), PlannerError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(PlannerError::internal(format!(
            "{name} must be between 0 and 1, got {rate}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn for_year_returns_2024_table() {
        let table = ConstantTable::for_year(2024).unwrap();

        assert_eq!(table.tax_year, 2024);
        assert_eq!(table.cpp.ympe, dec!(68500));
        assert_eq!(table.ei.max_insurable_earnings, dec!(63200));
        assert_eq!(table.personal_brackets.len(), 9);
    }

    #[test]
    fn for_year_rejects_unknown_year() {
        let result = ConstantTable::for_year(1999);

        assert!(matches!(result, Err(PlannerError::Validation(msg)) if msg.contains("1999")));
    }

    #[test]
    fn builtin_table_is_valid() {
        assert_eq!(ConstantTable::for_year(2024).unwrap().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut table = ConstantTable::for_year(2024).unwrap();
        table.corporate.small_business_rate = dec!(1.22);

        let err = table.validate().unwrap_err();

        assert!(matches!(&err, PlannerError::Internal(msg) if msg.contains("small_business_rate")));
    }

    #[test]
    fn validate_rejects_negative_rate_in_lookup_table() {
        let mut table = ConstantTable::for_year(2024).unwrap();
        table.investment.marginal_rates.over_200k = dec!(-0.1);

        assert!(matches!(table.validate(), Err(PlannerError::Internal(_))));
    }

    #[test]
    fn validate_rejects_yampe_below_ympe() {
        let mut table = ConstantTable::for_year(2024).unwrap();
        table.cpp.yampe = dec!(60000);

        assert!(matches!(table.validate(), Err(PlannerError::Internal(msg)) if msg.contains("yampe")));
    }
}
