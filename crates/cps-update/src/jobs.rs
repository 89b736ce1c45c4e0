//! Job/progress records in the backend `jobs` table.

use cps_core::{AppConfig, Job, JobStatus, Marketplace};
use cps_supabase::{Query, SupabaseClient};
use serde_json::json;

use crate::error::UpdateError;

pub const JOBS_TABLE: &str = "jobs";

/// Creates and reads job records.
#[derive(Debug, Clone)]
pub struct JobStore {
    client: SupabaseClient,
}

impl JobStore {
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Builds a store that writes with the service-role key when configured.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Store`] if the backend client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpdateError> {
        let client = SupabaseClient::from_config(config)?.with_api_key(config.job_write_key());
        Ok(Self::new(client))
    }

    /// Inserts a pending job for `marketplace` and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Store`] if the insert fails.
    pub async fn create(&self, marketplace: Marketplace) -> Result<Job, UpdateError> {
        let row = json!({
            "marketplace": marketplace.key(),
            "status": JobStatus::Pending,
            "progress": 0,
        });
        let job: Job = self.client.insert_returning(JOBS_TABLE, &row).await?;
        tracing::info!(job_id = %job.id, marketplace = %marketplace, "created update job");
        Ok(job)
    }

    /// Reads the job with `job_id`.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::JobNotFound`] when no such record exists.
    /// - [`UpdateError::Store`] on any other backend failure.
    pub async fn get(&self, job_id: &str) -> Result<Job, UpdateError> {
        let query = Query::table(JOBS_TABLE).eq("id", job_id);
        self.client.select_single(&query).await.map_err(|e| {
            if e.is_not_found() {
                UpdateError::JobNotFound(job_id.to_string())
            } else {
                UpdateError::Store(e)
            }
        })
    }

    /// Marks a job as failed with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Store`] if the update fails.
    pub async fn mark_failed(&self, job_id: &str, message: &str) -> Result<(), UpdateError> {
        let patch = json!({ "status": JobStatus::Failed, "error": message });
        self.client
            .update(JOBS_TABLE, &[("id", job_id)], &patch)
            .await?;
        Ok(())
    }
}
