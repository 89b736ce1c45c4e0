use crate::app_config::{AppConfig, Environment, GithubConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let supabase_url = require("SUPABASE_URL")?;
    let supabase_anon_key = require("SUPABASE_ANON_KEY")?;
    let supabase_service_role_key = optional("SUPABASE_SERVICE_ROLE_KEY");

    let env = parse_environment(&or_default("CPS_ENV", "development"));
    let bind_addr = parse_addr("CPS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CPS_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("CPS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CPS_USER_AGENT", "comprosearch/0.1");
    let max_retries = parse_u32("CPS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("CPS_RETRY_BACKOFF_BASE_MS", "500")?;

    let category_page_size = parse_usize("CPS_CATEGORY_PAGE_SIZE", "1000")?;
    if category_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CPS_CATEGORY_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let job_poll_interval_ms = parse_u64("CPS_JOB_POLL_INTERVAL_MS", "2500")?;
    let job_poll_timeout_secs = parse_u64("CPS_JOB_POLL_TIMEOUT_SECS", "1800")?;

    let github = match (optional("CPS_GITHUB_REPO"), optional("CPS_GITHUB_TOKEN")) {
        (Some(repo), Some(token)) => {
            if repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
                return Err(ConfigError::InvalidEnvVar {
                    var: "CPS_GITHUB_REPO".to_string(),
                    reason: format!("expected owner/repo, got {repo:?}"),
                });
            }
            Some(GithubConfig {
                api_url: or_default("CPS_GITHUB_API_URL", "https://api.github.com"),
                repo,
                token,
                git_ref: or_default("CPS_GITHUB_REF", "main"),
                workflow_oksid: or_default("CPS_WORKFLOW_OKSID", "oksid.yml"),
                workflow_penta: or_default("CPS_WORKFLOW_PENTA", "bayinet.yml"),
                workflow_denge: or_default("CPS_WORKFLOW_DENGE", "denge.yml"),
            })
        }
        _ => None,
    };

    Ok(AppConfig {
        supabase_url,
        supabase_anon_key,
        supabase_service_role_key,
        env,
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        category_page_size,
        job_poll_interval_ms,
        job_poll_timeout_secs,
        github,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
