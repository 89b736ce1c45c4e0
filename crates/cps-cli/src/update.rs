//! `update` and `job` command handlers.

use cps_core::{AppConfig, Marketplace};
use cps_update::{JobStore, UpdateService};

use crate::print_json;

/// Starts a refresh of `marketplace` and, unless `no_wait`, follows the job
/// until it finishes.
///
/// # Errors
///
/// Returns an error if updates are not configured, the job cannot be
/// created or dispatched, polling gives up, or the job ends as failed.
pub(crate) async fn run_update(
    config: &AppConfig,
    marketplace: Marketplace,
    no_wait: bool,
) -> anyhow::Result<()> {
    let service = UpdateService::from_config(config)?;
    let job = service.start(marketplace).await?;
    tracing::info!(job_id = %job.id, marketplace = %marketplace, "update started");

    if no_wait {
        return print_json(&job);
    }

    let mut last_seen = None;
    let finished = service
        .poll(&job.id, |job| {
            let observed = (job.status, job.progress);
            if last_seen != Some(observed) {
                tracing::info!(status = %job.status, progress = job.progress, "job progress");
                last_seen = Some(observed);
            }
        })
        .await?;
    print_json(&finished)?;

    if !finished.status.is_success() {
        anyhow::bail!(
            "update job {} ended as {}: {}",
            finished.id,
            finished.status,
            finished.error.as_deref().unwrap_or("no error message")
        );
    }
    Ok(())
}

/// Prints the job record with `job_id`.
///
/// # Errors
///
/// Returns an error if the job store cannot be reached or the job does not
/// exist.
pub(crate) async fn run_job(config: &AppConfig, job_id: &str) -> anyhow::Result<()> {
    let job = JobStore::from_config(config)?.get(job_id).await?;
    print_json(&job)
}
