use thiserror::Error;

/// Errors returned by [`crate::SupabaseClient`].
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend error {status} for {context}: {message}")]
    Api {
        status: u16,
        /// Backend error code, e.g. `"PGRST202"` for a missing function.
        code: Option<String>,
        message: String,
        context: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl SupabaseError {
    /// `true` when the addressed table, row or function does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            SupabaseError::Api { status, code, .. } => {
                *status == 404
                    || *status == 406
                    || matches!(code.as_deref(), Some("PGRST116" | "PGRST202"))
            }
            _ => false,
        }
    }

    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            SupabaseError::Api { status, .. } => Some(*status),
            SupabaseError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
