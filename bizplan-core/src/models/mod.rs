mod calculation_record;
mod constant_table;
mod income_bracket;
mod tax_bracket;

pub use calculation_record::{CalculationKind, CalculationRecord, NewCalculationRecord, User};
pub use constant_table::{
    ConstantTable, CorporateConstants, CppConstants, DividendConstants, EiConstants,
    InvestmentConstants, RrspConstants,
};
pub use income_bracket::{IncomeBracket, IncomeRateTable};
pub use tax_bracket::TaxBracket;
