//! CPP, CPP2 and EI contributions on a single salary figure.
//!
//! Employer CPP is modelled as equal to the employee amount. Employer EI is
//! the employee premium times a fixed multiplier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{clamp, round_half_up};
use crate::models::{CppConstants, EiConstants};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppContribution {
    pub contributory_earnings: Decimal,
    pub base: Decimal,
    pub cpp2_earnings: Decimal,
    pub cpp2: Decimal,
    /// Employee total: `base + cpp2`.
    pub employee: Decimal,
    pub employer: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EiContribution {
    pub insurable_earnings: Decimal,
    pub employee: Decimal,
    pub employer: Decimal,
}

pub fn calculate_cpp(
    salary: Decimal,
    constants: &CppConstants,
) -> CppContribution {
    let contributory_earnings = clamp(
        salary - constants.basic_exemption,
        Decimal::ZERO,
        constants.ympe - constants.basic_exemption,
    );
    let base = round_half_up(contributory_earnings * constants.employee_rate);

    let cpp2_earnings = clamp(
        salary - constants.ympe,
        Decimal::ZERO,
        constants.yampe - constants.ympe,
    );
    let cpp2 = round_half_up(cpp2_earnings * constants.cpp2_rate);

    let employee = base + cpp2;
    CppContribution {
        contributory_earnings,
        base,
        cpp2_earnings,
        cpp2,
        employee,
        employer: employee,
    }
}

pub fn calculate_ei(
    salary: Decimal,
    constants: &EiConstants,
) -> EiContribution {
    let insurable_earnings = clamp(salary, Decimal::ZERO, constants.max_insurable_earnings);
    let employee = round_half_up(insurable_earnings * constants.employee_rate);
    let employer = round_half_up(
        insurable_earnings * constants.employee_rate * constants.employer_multiplier,
    );

    EiContribution {
        insurable_earnings,
        employee,
        employer,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ConstantTable;

    fn constants() -> ConstantTable {
        ConstantTable::for_year(2024).unwrap()
    }

    // =========================================================================
    // CPP
    // =========================================================================

    #[test]
    fn cpp_is_zero_at_or_below_basic_exemption() {
        let table = constants();

        for salary in [dec!(0), dec!(1200), dec!(3500)] {
            let cpp = calculate_cpp(salary, &table.cpp);
            assert_eq!(cpp.employee, dec!(0), "salary {salary}");
            assert_eq!(cpp.employer, dec!(0), "salary {salary}");
        }
    }

    #[test]
    fn cpp_at_ympe_has_no_cpp2() {
        let cpp = calculate_cpp(dec!(68500), &constants().cpp);

        // (68500 - 3500) × 0.0595
        assert_eq!(cpp.base, dec!(3867.50));
        assert_eq!(cpp.cpp2, dec!(0));
        assert_eq!(cpp.employee, dec!(3867.50));
    }

    #[test]
    fn cpp2_applies_between_ympe_and_yampe() {
        let cpp = calculate_cpp(dec!(70000), &constants().cpp);

        assert_eq!(cpp.cpp2_earnings, dec!(1500));
        assert_eq!(cpp.cpp2, dec!(60.00));
        assert_eq!(cpp.employee, dec!(3927.50));
    }

    #[test]
    fn cpp_caps_at_yampe() {
        let cpp = calculate_cpp(dec!(250000), &constants().cpp);

        // 3867.50 + (73200 - 68500) × 0.04
        assert_eq!(cpp.employee, dec!(4055.50));
    }

    #[test]
    fn employer_cpp_mirrors_employee() {
        let cpp = calculate_cpp(dec!(45000), &constants().cpp);

        assert_eq!(cpp.employer, cpp.employee);
        assert_eq!(cpp.employee, dec!(2469.25));
    }

    // =========================================================================
    // EI
    // =========================================================================

    #[test]
    fn ei_is_capped_at_max_insurable_earnings() {
        let table = constants();

        for salary in [dec!(63200), dec!(100000)] {
            let ei = calculate_ei(salary, &table.ei);
            assert_eq!(ei.insurable_earnings, dec!(63200));
            assert_eq!(ei.employee, dec!(1049.12));
        }
    }

    #[test]
    fn ei_employer_is_multiple_of_employee() {
        let ei = calculate_ei(dec!(50000), &constants().ei);

        assert_eq!(ei.employee, dec!(830.00));
        assert_eq!(ei.employer, dec!(1162.00));
    }

    #[test]
    fn ei_on_zero_salary_is_zero() {
        let ei = calculate_ei(Decimal::ZERO, &constants().ei);

        assert_eq!(ei.employee, dec!(0));
        assert_eq!(ei.employer, dec!(0));
    }
}
