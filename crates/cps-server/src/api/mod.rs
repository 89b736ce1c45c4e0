mod catalog;
mod marketplaces;
mod updates;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use cps_catalog::CatalogEngine;
use cps_core::Marketplace;
use cps_supabase::SupabaseClient;
use cps_update::UpdateService;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, RateLimitState, RequestId, REQUEST_ID_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CatalogEngine<SupabaseClient>>,
    /// `None` when CI dispatch is not configured.
    pub updates: Option<Arc<UpdateService>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    updates: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "dispatch_failed" => StatusCode::BAD_GATEWAY,
            "update_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Resolves a `{store}` path segment; unknown stores are `not_found`.
pub(super) fn parse_store(request_id: &str, raw: &str) -> Result<Marketplace, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(
            request_id,
            "not_found",
            format!("marketplace '{raw}' not found"),
        )
    })
}

/// Wraps an extractor rejection (bad JSON body, malformed query) in the error envelope.
pub(super) fn rejected(request_id: &str, rejection: &impl std::fmt::Display) -> ApiError {
    ApiError::new(request_id, "validation_error", rejection.to_string())
}

/// Trims a required query value, rejecting missing or blank input.
pub(super) fn required_param<'a>(
    request_id: &str,
    name: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("query parameter '{name}' is required"),
            )
        })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Only starting an update is rate limited; job reads are polled freely.
fn update_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/updates",
            post(updates::start_update).route_layer(axum::middleware::from_fn_with_state(
                rate_limit,
                enforce_rate_limit,
            )),
        )
        .route("/api/v1/updates/{job_id}", get(updates::get_job))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let catalog_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/search", get(catalog::search))
        .route("/api/v1/compare", get(catalog::compare))
        .route(
            "/api/v1/products/by-category",
            get(catalog::products_by_category),
        )
        .route("/api/v1/categories/{store}", get(marketplaces::categories))
        .route(
            "/api/v1/categories/{store}/products",
            get(marketplaces::category_products),
        )
        .route(
            "/api/v1/marketplaces/{store}/products",
            get(marketplaces::browse),
        )
        .route(
            "/api/v1/marketplaces/{store}/last-updated",
            get(marketplaces::last_updated),
        );

    Router::new()
        .merge(catalog_routes)
        .merge(update_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let data = HealthData {
        status: "ok",
        updates: if state.updates.is_some() {
            "enabled"
        } else {
            "disabled"
        },
    };
    Json(ApiResponse::new(data, req_id.0))
}

/// Update starts dispatch CI runs; keep them to a handful per minute.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(10, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
