//! Marketplace refresh: a job/progress record in the backend plus a CI
//! workflow dispatch that runs the scraper out of band.
//!
//! The scraper updates the job record as it goes; [`UpdateService::poll`]
//! watches that record until it reaches a terminal status.

pub mod error;
pub mod github;
pub mod jobs;
pub mod service;

pub use error::UpdateError;
pub use github::WorkflowDispatcher;
pub use jobs::JobStore;
pub use service::{PollSettings, UpdateService};
