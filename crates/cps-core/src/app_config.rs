use std::net::SocketAddr;

use crate::Marketplace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Settings for triggering the scraper workflows on the CI host.
#[derive(Clone)]
pub struct GithubConfig {
    pub api_url: String,
    /// `owner/repo`.
    pub repo: String,
    pub token: String,
    pub git_ref: String,
    pub workflow_oksid: String,
    pub workflow_penta: String,
    pub workflow_denge: String,
}

impl GithubConfig {
    /// Workflow file that re-scrapes `marketplace`.
    #[must_use]
    pub fn workflow_for(&self, marketplace: Marketplace) -> &str {
        match marketplace {
            Marketplace::Oksid => &self.workflow_oksid,
            Marketplace::Penta => &self.workflow_penta,
            Marketplace::Denge => &self.workflow_denge,
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .field("token", &"[redacted]")
            .field("git_ref", &self.git_ref)
            .field("workflow_oksid", &self.workflow_oksid)
            .field("workflow_penta", &self.workflow_penta)
            .field("workflow_denge", &self.workflow_denge)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub category_page_size: usize,
    pub job_poll_interval_ms: u64,
    pub job_poll_timeout_secs: u64,
    /// `None` when the CI repo or token is not configured; the update
    /// surface is disabled in that case.
    pub github: Option<GithubConfig>,
}

impl AppConfig {
    /// Key used for job-record writes: the service-role key when present,
    /// else the anon key.
    #[must_use]
    pub fn job_write_key(&self) -> &str {
        self.supabase_service_role_key
            .as_deref()
            .unwrap_or(&self.supabase_anon_key)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[redacted]")
            .field(
                "supabase_service_role_key",
                &self.supabase_service_role_key.as_ref().map(|_| "[redacted]"),
            )
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("category_page_size", &self.category_page_size)
            .field("job_poll_interval_ms", &self.job_poll_interval_ms)
            .field("job_poll_timeout_secs", &self.job_poll_timeout_secs)
            .field("github", &self.github)
            .finish()
    }
}
