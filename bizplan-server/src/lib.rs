pub mod config;
pub mod dto;
pub mod error;
pub mod logging;
pub mod routes;
pub mod service;

pub use config::{Cli, Settings};
pub use error::ApiError;
pub use routes::router;
pub use service::PlannerService;
