use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a progressive schedule.
///
/// `max_income` is inclusive; `None` marks the final, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        min_income: Decimal,
        max_income: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income: Some(max_income),
            tax_rate,
        }
    }

    pub fn unbounded(
        min_income: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income: None,
            tax_rate,
        }
    }

    /// Number of whole dollars the bracket covers, counting both ends.
    ///
    /// Returns `None` for the unbounded bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income
            .map(|max| max - self.min_income + Decimal::ONE)
    }
}
