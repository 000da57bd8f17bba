pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use db::{create_pool, MemoryScenarioStore, PgScenarioStore, ScenarioStore};
pub use error::{AppError, ValidationError};
pub use service::{ReportRenderer, RoiEngine, RoiPolicy};
