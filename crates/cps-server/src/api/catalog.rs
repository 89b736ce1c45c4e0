//! Cross-marketplace queries: name search, price comparison, category lookup.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use cps_core::Product;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{required_param, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub store: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryQuery {
    pub category: Option<String>,
    pub store: Option<String>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let term = required_param(&req_id.0, "q", query.q.as_deref())?;
    let products = state
        .engine
        .search_by_name(term, query.store.as_deref())
        .await;
    Ok(Json(ApiResponse::new(products, req_id.0)))
}

pub(super) async fn compare(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let term = required_param(&req_id.0, "q", query.q.as_deref())?;
    let products = state.engine.compare_across_stores(term).await;
    Ok(Json(ApiResponse::new(products, req_id.0)))
}

pub(super) async fn products_by_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let category = required_param(&req_id.0, "category", query.category.as_deref())?;
    let products = state
        .engine
        .get_by_category(category, query.store.as_deref())
        .await;
    Ok(Json(ApiResponse::new(products, req_id.0)))
}
