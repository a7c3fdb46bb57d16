use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CalculationKind, CalculationRecord, NewCalculationRecord, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistence for users and the calculation audit trail.
#[async_trait]
pub trait PlannerRepository: Send + Sync {
    // Users
    async fn find_user_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    // Calculation audit trail
    async fn count_calculations_for_user(
        &self,
        user_id: i64,
        kind: CalculationKind,
    ) -> Result<i64, RepositoryError>;

    async fn record_calculation(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError>;

    async fn get_calculation(&self, id: i64) -> Result<CalculationRecord, RepositoryError>;
}
