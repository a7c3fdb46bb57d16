use anyhow::{Context, Result};
use async_trait::async_trait;
use bizplan_core::{
    CalculationKind, CalculationRecord, NewCalculationRecord, PlannerRepository, RepositoryError,
    User,
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url`, e.g. `sqlite:bizplan.db?mode=rwc`.
    ///
    /// In-memory databases get a single connection so every query sees the
    /// same schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Provisions a user. Account management lives outside the planner; this
    /// exists for seeding and tests.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result =
            sqlx::query("INSERT INTO users (email, display_name, created_at) VALUES (?, ?, ?)")
                .bind(email)
                .bind(display_name)
                .bind(&now)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
        }
    }
}

#[derive(FromRow)]
struct CalculationRow {
    id: i64,
    kind: String,
    user_id: Option<i64>,
    sequence: i64,
    input_json: String,
    result_json: String,
    created_at: String,
}

impl TryFrom<CalculationRow> for CalculationRecord {
    type Error = RepositoryError;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        let kind = CalculationKind::parse(&row.kind).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid calculation kind: {}", row.kind))
        })?;
        Ok(CalculationRecord {
            id: row.id,
            kind,
            user_id: row.user_id,
            sequence: row.sequence,
            input: parse_json("input_json", &row.input_json)?,
            result: parse_json("result_json", &row.result_json)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

fn parse_json(
    column: &str,
    s: &str,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::from_str(s)
        .map_err(|e| RepositoryError::Database(format!("Failed to parse {column}: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl PlannerRepository for SqliteRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let row: UserRow =
            sqlx::query_as("SELECT id, email, display_name FROM users WHERE email = ?")
                .bind(email.trim())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?
                .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn count_calculations_for_user(
        &self,
        user_id: i64,
        kind: CalculationKind,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM calculations WHERE user_id = ? AND kind = ?")
                .bind(user_id)
                .bind(kind.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn record_calculation(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "INSERT INTO calculations (
                kind, user_id, sequence, input_json, result_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.kind.as_str())
        .bind(record.user_id)
        .bind(record.sequence)
        .bind(record.input.to_string())
        .bind(record.result.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!(id, kind = record.kind.as_str(), "recorded calculation");
        self.get_calculation(id).await
    }

    async fn get_calculation(&self, id: i64) -> Result<CalculationRecord, RepositoryError> {
        let row: CalculationRow = sqlx::query_as(
            "SELECT id, kind, user_id, sequence, input_json, result_json, created_at
             FROM calculations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
