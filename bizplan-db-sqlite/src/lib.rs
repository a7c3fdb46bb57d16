//! SQLite persistence for the planner's users and calculation audit trail.

mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
