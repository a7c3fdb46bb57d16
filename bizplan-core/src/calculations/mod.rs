//! Deterministic planner calculations.
//!
//! Everything here is a pure function of its inputs and a [`ConstantTable`](crate::ConstantTable).

pub mod common;
pub mod dividend;
pub mod format;
pub mod investment;
pub mod payroll;
pub mod progressive;
pub mod salary_dividend;

pub use dividend::{DividendTax, calculate_dividend_tax};
pub use investment::{
    InvestmentComparator, InvestmentComparison, InvestmentProfile, InvestmentVehicle,
    RankedVehicle, TaxComponent, VehicleOutcome, VehicleResult, rank_vehicles,
};
pub use payroll::{CppContribution, EiContribution, calculate_cpp, calculate_ei};
pub use progressive::{ProgressiveTaxSchedule, calculate_personal_tax};
pub use salary_dividend::{
    BusinessProfile, PersonalTaxBreakdown, STANDARD_SCENARIOS, SalaryDividendComparator,
    SalaryDividendStrategy, SplitScenario,
};
