//! Start a marketplace refresh and follow its job record to completion.

use std::time::Duration;

use cps_core::{AppConfig, Job, Marketplace};
use tokio::time::Instant;

use crate::error::UpdateError;
use crate::github::WorkflowDispatcher;
use crate::jobs::JobStore;

/// Consecutive failed job reads after which polling gives up.
const MAX_CONSECUTIVE_READ_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.job_poll_interval_ms),
            timeout: Duration::from_secs(config.job_poll_timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateService {
    jobs: JobStore,
    dispatcher: WorkflowDispatcher,
    poll: PollSettings,
}

impl UpdateService {
    #[must_use]
    pub fn new(jobs: JobStore, dispatcher: WorkflowDispatcher, poll: PollSettings) -> Self {
        Self {
            jobs,
            dispatcher,
            poll,
        }
    }

    /// # Errors
    ///
    /// - [`UpdateError::NotConfigured`] when no CI repository/token is set.
    /// - [`UpdateError::Store`] or [`UpdateError::Http`] if a client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpdateError> {
        let github = config.github.clone().ok_or_else(|| {
            UpdateError::NotConfigured(
                "CPS_GITHUB_REPO and CPS_GITHUB_TOKEN must be set".to_string(),
            )
        })?;
        let dispatcher =
            WorkflowDispatcher::new(github, config.request_timeout_secs, &config.user_agent)?;
        Ok(Self::new(
            JobStore::from_config(config)?,
            dispatcher,
            PollSettings::from_config(config),
        ))
    }

    /// Creates a job record and dispatches the scraper workflow for it.
    ///
    /// If the dispatch is rejected the job is marked failed (best effort) so
    /// it does not stay pending forever.
    ///
    /// # Errors
    ///
    /// Returns the job-store error if the record cannot be created, or the
    /// dispatch error ([`UpdateError::Dispatch`] / [`UpdateError::Http`]).
    pub async fn start(&self, marketplace: Marketplace) -> Result<Job, UpdateError> {
        let job = self.jobs.create(marketplace).await?;

        if let Err(e) = self.dispatcher.dispatch(marketplace, &job.id).await {
            tracing::warn!(
                job_id = %job.id,
                marketplace = %marketplace,
                error = %e,
                "workflow dispatch failed"
            );
            if let Err(mark_err) = self.jobs.mark_failed(&job.id, &e.to_string()).await {
                tracing::warn!(job_id = %job.id, error = %mark_err, "could not mark job failed");
            }
            return Err(e);
        }
        Ok(job)
    }

    /// Reads the current state of a job.
    ///
    /// # Errors
    ///
    /// See [`JobStore::get`].
    pub async fn job(&self, job_id: &str) -> Result<Job, UpdateError> {
        self.jobs.get(job_id).await
    }

    /// Reads the job every poll interval, reporting each observation to
    /// `on_progress`, until its status is terminal.
    ///
    /// Dropping the returned future stops polling; the remote job keeps
    /// running.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::PollTimeout`] once the configured timeout elapses.
    /// - The last read error after three consecutive failed reads.
    pub async fn poll<F>(&self, job_id: &str, mut on_progress: F) -> Result<Job, UpdateError>
    where
        F: FnMut(&Job),
    {
        let started = Instant::now();
        let mut failures = 0u32;
        let mut last_status = None;

        loop {
            match self.jobs.get(job_id).await {
                Ok(job) => {
                    failures = 0;
                    last_status = Some(job.status);
                    on_progress(&job);
                    if job.status.is_terminal() {
                        return Ok(job);
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(job_id, failures, error = %e, "job read failed");
                    if failures >= MAX_CONSECUTIVE_READ_FAILURES {
                        return Err(e);
                    }
                }
            }

            if started.elapsed() >= self.poll.timeout {
                return Err(UpdateError::PollTimeout {
                    job_id: job_id.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                    last_status,
                });
            }
            tokio::time::sleep(self.poll.interval).await;
        }
    }
}
