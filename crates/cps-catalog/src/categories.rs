//! Distinct category listing per marketplace.
//!
//! Categories are not kept in a reference table; they are denormalized onto
//! every product row. Listing them tries the optional server-side
//! `get_distinct_<key>_categories` function first and otherwise scans the
//! category column page by page until a short page.

use std::collections::HashSet;

use cps_core::{Category, Marketplace};
use cps_supabase::Query;
use serde_json::Value;

use crate::category_codes;
use crate::collate::turkish_cmp;
use crate::engine::CatalogEngine;
use crate::raw::scalar_text;
use crate::source::ProductSource;
use crate::tables::{table_for, TableSpec};

/// Upper bound on pages read by one category scan.
const MAX_CATEGORY_PAGES: usize = 1_000;

impl<S: ProductSource> CatalogEngine<S> {
    /// Categories of the marketplace named `store`, or none (logged) if the
    /// name is unknown.
    pub async fn categories(&self, store: &str) -> Vec<Category> {
        match store.parse::<Marketplace>() {
            Ok(marketplace) => self.categories_for(marketplace).await,
            Err(e) => {
                tracing::warn!(error = %e, "unknown store, returning no categories");
                Vec::new()
            }
        }
    }

    /// Sorted, de-duplicated categories present in `marketplace`'s table.
    ///
    /// Ids are 1-based positions in the returned list.
    pub async fn categories_for(&self, marketplace: Marketplace) -> Vec<Category> {
        let spec = table_for(marketplace);
        let values = match self.distinct_categories_rpc(spec).await {
            Some(values) => values,
            None => self.scan_categories(spec).await,
        };
        let names = distinct_sorted(marketplace, values);
        tracing::debug!(marketplace = %marketplace, count = names.len(), "listed categories");
        Category::enumerate(marketplace, names)
    }

    async fn distinct_categories_rpc(&self, spec: &TableSpec) -> Option<Vec<String>> {
        let function = spec.distinct_categories_rpc();
        match self
            .source()
            .call_rpc(&function, &Value::Object(serde_json::Map::new()))
            .await
        {
            Ok(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| category_value(spec, item))
                    .collect(),
            ),
            Ok(_) => {
                tracing::debug!(function, "distinct-categories function returned no list");
                None
            }
            Err(e) => {
                tracing::debug!(
                    function,
                    error = %e,
                    "distinct-categories function unavailable, scanning table"
                );
                None
            }
        }
    }

    /// Reads the category column in pages of `category_page_size` rows.
    ///
    /// A failing page ends the scan with what was collected so far.
    async fn scan_categories(&self, spec: &TableSpec) -> Vec<String> {
        let page_size = self.category_page_size;
        let mut values = Vec::new();
        let mut offset = 0usize;

        for page_number in 1..=MAX_CATEGORY_PAGES {
            let query = Query::table(spec.table)
                .select(spec.category_column)
                .not_null(spec.category_column)
                .range(offset, offset + page_size - 1);

            let rows = match self.fetch_with_fallback(spec, &query).await {
                Ok(page) => page.rows,
                Err(e) => {
                    tracing::warn!(
                        marketplace = %spec.marketplace,
                        page = page_number,
                        error = %e,
                        "category scan page failed, keeping partial list"
                    );
                    return values;
                }
            };

            let fetched = rows.len();
            values.extend(rows.iter().filter_map(|row| category_value(spec, row)));
            tracing::debug!(
                marketplace = %spec.marketplace,
                page = page_number,
                fetched,
                collected = values.len(),
                "category scan page"
            );

            if fetched < page_size {
                return values;
            }
            offset += page_size;
        }

        tracing::warn!(
            marketplace = %spec.marketplace,
            max_pages = MAX_CATEGORY_PAGES,
            "category scan reached page limit"
        );
        values
    }
}

/// Category value of a scanned row or RPC item, trimmed; blank is `None`.
fn category_value(spec: &TableSpec, item: &Value) -> Option<String> {
    let raw = match item {
        Value::Object(map) => [spec.category_column, "category", "categoryCode"]
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_text)),
        other => scalar_text(other),
    }?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Display names (Penta codes resolved), de-duplicated, in Turkish order.
fn distinct_sorted(marketplace: Marketplace, values: Vec<String>) -> Vec<String> {
    let unique: HashSet<String> = values
        .into_iter()
        .map(|value| match marketplace {
            Marketplace::Penta => category_codes::display_label(Some(&value)),
            Marketplace::Oksid | Marketplace::Denge => value,
        })
        .collect();
    let mut names: Vec<String> = unique.into_iter().collect();
    names.sort_by(|a, b| turkish_cmp(a, b));
    names
}
