//! Triggers the scraper workflow on the CI host.

use std::time::Duration;

use cps_core::{GithubConfig, Marketplace};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{json, Value};

use crate::error::UpdateError;

const API_VERSION: &str = "2022-11-28";

/// Sends `workflow_dispatch` events for the per-marketplace scraper workflows.
#[derive(Debug, Clone)]
pub struct WorkflowDispatcher {
    client: reqwest::Client,
    config: GithubConfig,
}

impl WorkflowDispatcher {
    /// # Errors
    ///
    /// Returns [`UpdateError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: GithubConfig,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    fn dispatch_url(&self, marketplace: Marketplace) -> String {
        format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo,
            self.config.workflow_for(marketplace)
        )
    }

    /// Starts the workflow for `marketplace`, passing `job_id` so the
    /// scraper can report progress on that record.
    ///
    /// The CI host answers `204 No Content`; any 2xx counts as accepted.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::Dispatch`] when the CI host rejects the request.
    /// - [`UpdateError::Http`] on network failure.
    pub async fn dispatch(
        &self,
        marketplace: Marketplace,
        job_id: &str,
    ) -> Result<(), UpdateError> {
        let body = json!({
            "ref": self.config.git_ref,
            "inputs": {
                "marketplace": marketplace.key(),
                "job_id": job_id,
            },
        });

        let response = self
            .client
            .post(self.dispatch_url(marketplace))
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(marketplace = %marketplace, job_id, "workflow dispatched");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);
        Err(UpdateError::Dispatch {
            status: status.as_u16(),
            message,
        })
    }
}
