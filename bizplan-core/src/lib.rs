pub mod calculations;
pub mod db;
pub mod error;
pub mod models;

pub use db::repository::{PlannerRepository, RepositoryError};
pub use error::PlannerError;
pub use models::*;
