use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use bizplan_ai::build_generator;
use bizplan_core::ConstantTable;
use bizplan_core::db::RepositoryRegistry;
use bizplan_db_sqlite::SqliteRepositoryFactory;
use bizplan_server::{Cli, PlannerService, Settings, logging, router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    logging::init(&settings.log_level, settings.log_file.as_deref())?;

    let table = ConstantTable::for_year(settings.tax_year)
        .and_then(|table| table.validate().map(|()| table))
        .with_context(|| format!("No usable constant table for tax year {}", settings.tax_year))?;

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    let repository = registry
        .create(&settings.database)
        .await
        .context("Failed to open database")?;

    let generator = build_generator(&settings.ai).with_context(|| {
        format!(
            "Failed to configure AI provider '{}'",
            settings.ai.provider.name()
        )
    })?;

    info!(
        tax_year = table.tax_year,
        backend = %settings.database.backend,
        provider = generator.provider_name(),
        "planner ready"
    );

    let service = PlannerService::new(Arc::new(table), Arc::from(repository), generator);
    let app = router(service);

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    info!(addr = %settings.bind, "listening");

    axum::serve(listener, app).await.context("Server error")
}
