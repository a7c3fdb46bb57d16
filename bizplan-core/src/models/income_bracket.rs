use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Coarse income level used as a key into the investment rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeBracket {
    Under50K,
    From50KTo100K,
    From100KTo200K,
    Over200K,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 4] = [
        Self::Under50K,
        Self::From50KTo100K,
        Self::From100KTo200K,
        Self::Over200K,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under50K => "Under $50K",
            Self::From50KTo100K => "$50-100K",
            Self::From100KTo200K => "$100-200K",
            Self::Over200K => "Over $200K",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Under $50K" => Some(Self::Under50K),
            "$50-100K" => Some(Self::From50KTo100K),
            "$100-200K" => Some(Self::From100KTo200K),
            "Over $200K" => Some(Self::Over200K),
            _ => None,
        }
    }

    /// Like [`IncomeBracket::parse`], but names the offending field on failure.
    pub fn from_label(
        field: &str,
        label: &str,
    ) -> Result<Self, PlannerError> {
        Self::parse(label.trim()).ok_or_else(|| {
            let expected: Vec<&str> = Self::ALL.iter().map(IncomeBracket::as_str).collect();
            PlannerError::validation(format!(
                "{field}: unknown income bracket '{label}'; expected one of {expected:?}"
            ))
        })
    }
}

/// A rate per income bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRateTable {
    pub under_50k: Decimal,
    pub from_50k_to_100k: Decimal,
    pub from_100k_to_200k: Decimal,
    pub over_200k: Decimal,
}

impl IncomeRateTable {
    pub fn rate_for(
        &self,
        bracket: IncomeBracket,
    ) -> Decimal {
        match bracket {
            IncomeBracket::Under50K => self.under_50k,
            IncomeBracket::From50KTo100K => self.from_50k_to_100k,
            IncomeBracket::From100KTo200K => self.from_100k_to_200k,
            IncomeBracket::Over200K => self.over_200k,
        }
    }

    pub(crate) fn rates(&self) -> [Decimal; 4] {
        [
            self.under_50k,
            self.from_50k_to_100k,
            self.from_100k_to_200k,
            self.over_200k,
        ]
    }
}
