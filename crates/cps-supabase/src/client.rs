//! HTTP client for the hosted backend's REST surface.
//!
//! Wraps `reqwest` with API-key headers, the PostgREST query grammar from
//! [`crate::query`], exact-count pagination via `Content-Range`, and typed
//! error mapping. Transient failures are retried with back-off.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SupabaseError;
use crate::query::Query;
use crate::retry::retry_with_backoff;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Transport settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "comprosearch/0.1".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_config(config: &cps_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// Rows of one `SELECT` plus the exact total when it was requested.
#[derive(Debug, Clone, Default)]
pub struct SelectPage {
    pub rows: Vec<serde_json::Value>,
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Client for the backend's table, row and RPC endpoints.
///
/// Construct with [`SupabaseClient::new`] (or [`SupabaseClient::from_config`])
/// and pass it to whatever needs it; there is no global instance.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_url: Url,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url` (e.g.
    /// `https://xyz.supabase.co`). Requests go to `{base_url}/rest/v1/`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SupabaseError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        options: &ClientOptions,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        let normalised = format!("{}/rest/v1/", base_url.trim_end_matches('/'));
        let rest_url = Url::parse(&normalised).map_err(|e| SupabaseError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            rest_url,
            api_key: api_key.to_owned(),
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    /// Builds a read client from application config (anon key).
    ///
    /// # Errors
    ///
    /// See [`SupabaseClient::new`].
    pub fn from_config(config: &cps_core::AppConfig) -> Result<Self, SupabaseError> {
        Self::new(
            &config.supabase_url,
            &config.supabase_anon_key,
            &ClientOptions::from_config(config),
        )
    }

    /// Same connection pool and settings, different API key.
    #[must_use]
    pub fn with_api_key(&self, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_owned(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Runs `query` and returns the raw JSON rows.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::Api`] on a non-2xx status (after retries for 5xx/429).
    /// - [`SupabaseError::Http`] on network failure.
    /// - [`SupabaseError::Deserialize`] if the body is not a JSON array.
    pub async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>, SupabaseError> {
        Ok(self.select_page(query).await?.rows)
    }

    /// Runs `query`, returning rows and, when [`Query::count_exact`] was set,
    /// the total number of matching rows.
    ///
    /// # Errors
    ///
    /// Same as [`SupabaseClient::select`].
    pub async fn select_page(&self, query: &Query) -> Result<SelectPage, SupabaseError> {
        let url = self.table_url(query.table_name())?;
        let pairs = query.to_pairs();
        let context = format!("select from {}", query.table_name());
        let count = query.wants_count();

        let response = self
            .execute(&context, || {
                let request = self.client.get(url.clone()).query(&pairs);
                if count {
                    request.header("Prefer", "count=exact")
                } else {
                    request
                }
            })
            .await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        let rows = read_json::<Vec<serde_json::Value>>(response, &context).await?;
        Ok(SelectPage { rows, total })
    }

    /// Runs `query` expecting exactly one row.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] with status 406 when zero or several
    /// rows match (see [`SupabaseError::is_not_found`]), plus the errors of
    /// [`SupabaseClient::select`].
    pub async fn select_single<T: DeserializeOwned>(&self, query: &Query) -> Result<T, SupabaseError> {
        let url = self.table_url(query.table_name())?;
        let pairs = query.to_pairs();
        let context = format!("single row from {}", query.table_name());

        let response = self
            .execute(&context, || {
                self.client
                    .get(url.clone())
                    .query(&pairs)
                    .header(ACCEPT, SINGLE_OBJECT)
            })
            .await?;
        read_json(response, &context).await
    }

    /// Inserts one row and returns it as stored (server-side defaults applied).
    ///
    /// # Errors
    ///
    /// Same as [`SupabaseClient::select_single`].
    pub async fn insert_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &serde_json::Value,
    ) -> Result<T, SupabaseError> {
        let url = self.table_url(table)?;
        let context = format!("insert into {table}");

        let response = self
            .execute(&context, || {
                self.client
                    .post(url.clone())
                    .json(row)
                    .header("Prefer", "return=representation")
                    .header(ACCEPT, SINGLE_OBJECT)
            })
            .await?;
        read_json(response, &context).await
    }

    /// Applies `patch` to every row where all `(column, value)` pairs match.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] or [`SupabaseError::Http`] on failure.
    pub async fn update(
        &self,
        table: &str,
        matching: &[(&str, &str)],
        patch: &serde_json::Value,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table)?;
        let context = format!("update {table}");
        let pairs: Vec<(String, String)> = matching
            .iter()
            .map(|(column, value)| ((*column).to_string(), format!("eq.{value}")))
            .collect();

        self.execute(&context, || {
            self.client
                .patch(url.clone())
                .query(&pairs)
                .json(patch)
                .header("Prefer", "return=minimal")
        })
        .await?;
        Ok(())
    }

    /// Calls a remote procedure and returns its JSON result.
    ///
    /// # Errors
    ///
    /// A missing function surfaces as [`SupabaseError::Api`] for which
    /// [`SupabaseError::is_not_found`] is `true`.
    pub async fn rpc(
        &self,
        function: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, SupabaseError> {
        let url = self.table_url(&format!("rpc/{function}"))?;
        let context = format!("rpc {function}");

        let response = self
            .execute(&context, || self.client.post(url.clone()).json(args))
            .await?;
        read_json(response, &context).await
    }

    fn table_url(&self, path: &str) -> Result<Url, SupabaseError> {
        self.rest_url
            .join(path)
            .map_err(|e| SupabaseError::InvalidBaseUrl {
                url: format!("{}{path}", self.rest_url),
                reason: e.to_string(),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        request
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, bearer)
    }

    /// Sends the request produced by `build` (rebuilt for each attempt) and
    /// maps non-2xx statuses to [`SupabaseError::Api`].
    async fn execute<F>(&self, context: &str, build: F) -> Result<Response, SupabaseError>
    where
        F: Fn() -> RequestBuilder,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = self.authorize(build());
            async move {
                let response = request.send().await?;
                check_status(response, context).await
            }
        })
        .await
    }
}

async fn check_status(response: Response, context: &str) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => (parsed.code, parsed.message.unwrap_or(body)),
        Err(_) => (None, body),
    };

    Err(SupabaseError::Api {
        status: status.as_u16(),
        code,
        message,
        context: context.to_string(),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, SupabaseError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SupabaseError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Extracts the total from a `Content-Range` header such as `0-49/1234`
/// or `*/0`. Returns `None` when the total is unknown (`*`).
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
