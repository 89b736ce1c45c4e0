//! Marketplace refresh routes.
//!
//! - `POST /api/v1/updates`: create a job and dispatch the scraper
//! - `GET /api/v1/updates/{job_id}`: read the job record

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use cps_core::{Job, Marketplace};
use cps_update::{UpdateError, UpdateService};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{rejected, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct StartUpdateRequest {
    pub marketplace: String,
}

fn update_service(state: &AppState, request_id: &str) -> Result<Arc<UpdateService>, ApiError> {
    state.updates.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "update_unavailable",
            "marketplace updates are not configured on this server",
        )
    })
}

fn map_update_error(request_id: String, error: &UpdateError) -> ApiError {
    match error {
        UpdateError::JobNotFound(id) => {
            ApiError::new(request_id, "not_found", format!("job '{id}' not found"))
        }
        UpdateError::NotConfigured(reason) => {
            ApiError::new(request_id, "update_unavailable", reason.clone())
        }
        UpdateError::Dispatch { .. } | UpdateError::Http(_) => {
            tracing::error!(error = %error, "workflow dispatch failed");
            ApiError::new(request_id, "dispatch_failed", error.to_string())
        }
        UpdateError::Store(_) | UpdateError::PollTimeout { .. } => {
            tracing::error!(error = %error, "job store request failed");
            ApiError::new(request_id, "internal_error", "job store request failed")
        }
    }
}

pub(super) async fn start_update(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<StartUpdateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>), ApiError> {
    let updates = update_service(&state, &req_id.0)?;
    let Json(body) = body.map_err(|e| rejected(&req_id.0, &e))?;
    let marketplace: Marketplace = body.marketplace.parse().map_err(|_| {
        ApiError::new(
            &req_id.0,
            "validation_error",
            format!("unknown marketplace '{}'", body.marketplace),
        )
    })?;

    let job = updates
        .start(marketplace)
        .await
        .map_err(|e| map_update_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(job, req_id.0))))
}

pub(super) async fn get_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let updates = update_service(&state, &req_id.0)?;
    let job = updates
        .job(&job_id)
        .await
        .map_err(|e| map_update_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(job, req_id.0)))
}
