use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, as far as the planner cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationKind {
    TaxStrategy,
    Investment,
}

impl CalculationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaxStrategy => "tax_strategy",
            Self::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tax_strategy" => Some(Self::TaxStrategy),
            "investment" => Some(Self::Investment),
            _ => None,
        }
    }
}

/// Audit record of one planner run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub kind: CalculationKind,
    pub user_id: Option<i64>,
    /// 1-based position of this run among the user's runs of the same kind.
    pub sequence: i64,
    pub input: serde_json::Value,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// For recording new calculations (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalculationRecord {
    pub kind: CalculationKind,
    pub user_id: Option<i64>,
    pub sequence: i64,
    pub input: serde_json::Value,
    pub result: serde_json::Value,
}
