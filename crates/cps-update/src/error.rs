use cps_core::JobStatus;
use cps_supabase::SupabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// CI repository or token missing from configuration.
    #[error("updates are not configured: {0}")]
    NotConfigured(String),

    #[error("job store error: {0}")]
    Store(#[from] SupabaseError),

    #[error("job {0} not found")]
    JobNotFound(String),

    /// The CI host rejected the workflow dispatch.
    #[error("workflow dispatch failed with status {status}: {message}")]
    Dispatch { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gave up waiting for job {job_id} after {waited_secs}s")]
    PollTimeout {
        job_id: String,
        waited_secs: u64,
        last_status: Option<JobStatus>,
    },
}
