//! Cross-marketplace search, category filtering and price comparison.
//!
//! Multi-marketplace operations fan out one query per marketplace
//! concurrently and join the results, so latency is bounded by the slowest
//! marketplace. A marketplace whose query fails contributes nothing and the
//! failure is logged; callers only ever see fewer results, never an error.

use std::cmp::Ordering;

use cps_core::{Marketplace, Product};
use cps_supabase::{Query, SelectPage, SupabaseError};
use futures::future::join_all;

use crate::category_codes;
use crate::normalize::normalize_rows;
use crate::source::ProductSource;
use crate::tables::{table_for, TableSpec};

/// Rows per page when scanning a table for its categories.
pub const DEFAULT_CATEGORY_PAGE_SIZE: usize = 1000;

/// Aggregates the three marketplace tables behind one query surface.
#[derive(Debug)]
pub struct CatalogEngine<S> {
    source: S,
    pub(crate) category_page_size: usize,
}

impl<S: ProductSource> CatalogEngine<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            category_page_size: DEFAULT_CATEGORY_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_category_page_size(mut self, page_size: usize) -> Self {
        self.category_page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Case-insensitive substring search on product names.
    ///
    /// `store` restricts the search to one marketplace; `None` or blank
    /// searches all three. A blank `term` or an unknown `store` yields no
    /// results without querying anything.
    pub async fn search_by_name(&self, term: &str, store: Option<&str>) -> Vec<Product> {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("blank search term, skipping query");
            return Vec::new();
        }
        let Some(targets) = resolve_targets(store) else {
            return Vec::new();
        };

        join_all(targets.into_iter().map(|m| self.search_in(m, term)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Products whose category equals `category`.
    ///
    /// For Penta the label is first resolved back to its category code; a
    /// label with no code matches nothing there.
    pub async fn get_by_category(&self, category: &str, store: Option<&str>) -> Vec<Product> {
        let category = category.trim();
        if category.is_empty() {
            tracing::debug!("blank category, skipping query");
            return Vec::new();
        }
        let Some(targets) = resolve_targets(store) else {
            return Vec::new();
        };

        join_all(targets.into_iter().map(|m| self.category_in(m, category)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Searches every marketplace for `term` and orders the merged results
    /// by marketplace key, then by ascending price within each marketplace.
    pub async fn compare_across_stores(&self, term: &str) -> Vec<Product> {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("blank comparison term, skipping query");
            return Vec::new();
        }

        let mut products: Vec<Product> =
            join_all(Marketplace::ALL.into_iter().map(|m| self.search_in(m, term)))
                .await
                .into_iter()
                .flatten()
                .collect();
        sort_for_comparison(&mut products);
        products
    }

    async fn search_in(&self, marketplace: Marketplace, term: &str) -> Vec<Product> {
        let spec = table_for(marketplace);
        let query = Query::table(spec.table)
            .select(spec.select)
            .ilike_contains(spec.name_column, term)
            .order(spec.name_column, true);
        self.products_from(spec, &query, "search").await
    }

    async fn category_in(&self, marketplace: Marketplace, category: &str) -> Vec<Product> {
        let spec = table_for(marketplace);
        let Some(value) = category_filter_value(marketplace, category) else {
            tracing::debug!(
                marketplace = %marketplace,
                category,
                "category has no code in this marketplace"
            );
            return Vec::new();
        };
        let query = Query::table(spec.table)
            .select(spec.select)
            .eq(spec.category_column, value)
            .order(spec.name_column, true);
        self.products_from(spec, &query, "category").await
    }

    /// Runs `query`, normalizes the rows, and degrades a failure to no rows.
    async fn products_from(&self, spec: &TableSpec, query: &Query, operation: &str) -> Vec<Product> {
        match self.fetch_with_fallback(spec, query).await {
            Ok(page) => {
                tracing::debug!(
                    marketplace = %spec.marketplace,
                    operation,
                    count = page.rows.len(),
                    "marketplace query returned"
                );
                normalize_rows(spec.marketplace, page.rows)
            }
            Err(e) => {
                tracing::warn!(
                    marketplace = %spec.marketplace,
                    operation,
                    error = %e,
                    "marketplace query failed, contributing no results"
                );
                Vec::new()
            }
        }
    }

    /// Runs `query`; for tables with column drift, retries a failed explicit
    /// select with `select=*`.
    pub(crate) async fn fetch_with_fallback(
        &self,
        spec: &TableSpec,
        query: &Query,
    ) -> Result<SelectPage, SupabaseError> {
        match self.source.fetch_page(query).await {
            Err(e) if spec.select_fallback && query.columns() != "*" => {
                tracing::warn!(
                    marketplace = %spec.marketplace,
                    error = %e,
                    "explicit select failed, retrying with all columns"
                );
                self.source.fetch_page(&query.with_select("*")).await
            }
            result => result,
        }
    }
}

/// Orders products by marketplace key, then ascending price.
///
/// The grouping by marketplace comes first: the cheapest product overall is
/// not necessarily the first element.
pub fn sort_for_comparison(products: &mut [Product]) {
    products.sort_by(|a, b| {
        a.marketplace
            .key()
            .cmp(b.marketplace.key())
            .then_with(|| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
    });
}

/// Marketplaces addressed by an optional store filter, or `None` (logged)
/// when the filter names no marketplace.
fn resolve_targets(store: Option<&str>) -> Option<Vec<Marketplace>> {
    match Marketplace::parse_filter(store) {
        Ok(Some(m)) => Some(vec![m]),
        Ok(None) => Some(Marketplace::ALL.to_vec()),
        Err(e) => {
            tracing::warn!(error = %e, "unknown store filter, returning no results");
            None
        }
    }
}

/// Value compared against the category column of `marketplace`.
pub(crate) fn category_filter_value(marketplace: Marketplace, category: &str) -> Option<String> {
    match marketplace {
        Marketplace::Penta => category_codes::code_for_label(category),
        Marketplace::Oksid | Marketplace::Denge => {
            let category = category.trim();
            (!category.is_empty() && category != "all").then(|| category.to_string())
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
