//! Per-marketplace routes addressed by a `{store}` path segment.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use cps_catalog::{BrowseOptions, SortOrder};
use cps_core::{Category, Marketplace, Product};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{parse_store, rejected, required_param, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CategoryProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct BrowseQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(super) struct BrowseData {
    items: Vec<Product>,
    total: u64,
    page: usize,
    page_size: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct LastUpdatedData {
    marketplace: Marketplace,
    last_updated: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BrowseQuery {
    fn into_options(self, request_id: &str) -> Result<BrowseOptions, ApiError> {
        let defaults = BrowseOptions::default();
        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse::<SortOrder>().map_err(|e| {
                ApiError::new(request_id, "validation_error", e.to_string())
            })?,
            None => SortOrder::Default,
        };
        Ok(BrowseOptions {
            page: self.page.unwrap_or(defaults.page).max(1),
            page_size: self
                .page_size
                .unwrap_or(defaults.page_size)
                .clamp(1, cps_catalog::browse::MAX_PAGE_SIZE),
            search: non_blank(self.search),
            category: non_blank(self.category),
            sort,
            only_in_stock: self.in_stock.unwrap_or(false),
        })
    }
}

pub(super) async fn categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store): Path<String>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let marketplace = parse_store(&req_id.0, &store)?;
    let categories = state.engine.categories_for(marketplace).await;
    Ok(Json(ApiResponse::new(categories, req_id.0)))
}

pub(super) async fn category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store): Path<String>,
    Query(query): Query<CategoryProductsQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let marketplace = parse_store(&req_id.0, &store)?;
    let category = required_param(&req_id.0, "category", query.category.as_deref())?;
    let products = state
        .engine
        .get_by_category(category, Some(marketplace.key()))
        .await;
    Ok(Json(ApiResponse::new(products, req_id.0)))
}

pub(super) async fn browse(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store): Path<String>,
    query: Result<Query<BrowseQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<BrowseData>>, ApiError> {
    let marketplace = parse_store(&req_id.0, &store)?;
    let Query(query) = query.map_err(|e| rejected(&req_id.0, &e))?;
    let options = query.into_options(&req_id.0)?;
    let page = state.engine.browse(marketplace, &options).await;
    let data = BrowseData {
        items: page.items,
        total: page.total,
        page: options.page,
        page_size: options.page_size,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn last_updated(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store): Path<String>,
) -> Result<Json<ApiResponse<LastUpdatedData>>, ApiError> {
    let marketplace = parse_store(&req_id.0, &store)?;
    let data = LastUpdatedData {
        marketplace,
        last_updated: state.engine.last_updated(marketplace).await,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
