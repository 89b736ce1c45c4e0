//! Domain types and configuration shared by every ComProSearch crate.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod jobs;
pub mod marketplace;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, GithubConfig};
pub use categories::Category;
pub use config::{load_app_config, load_app_config_from_env};
pub use jobs::{Job, JobStatus};
pub use marketplace::{Marketplace, UnknownMarketplace};
pub use products::{Product, ProductPage};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
