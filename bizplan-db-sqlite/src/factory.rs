use async_trait::async_trait;

use bizplan_core::db::{DbConfig, RepositoryFactory};
use bizplan_core::{PlannerRepository, RepositoryError};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`bizplan_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use bizplan_core::db::RepositoryRegistry;
/// use bizplan_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` as a sqlx URL (`sqlite:bizplan.db?mode=rwc`,
    /// `sqlite::memory:`) and applies pending migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PlannerRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
