//! Paginated per-marketplace listing and the last-refresh timestamp.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use cps_core::{Marketplace, ProductPage};
use cps_supabase::Query;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{category_filter_value, CatalogEngine};
use crate::normalize::normalize_rows;
use crate::source::ProductSource;
use crate::tables::table_for;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Default,
    PriceLow,
    PriceHigh,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0:?} (expected default, price-low or price-high)")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(SortOrder::Default),
            "price-low" | "price_low" => Ok(SortOrder::PriceLow),
            "price-high" | "price_high" => Ok(SortOrder::PriceHigh),
            _ => Err(UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Default => "default",
            SortOrder::PriceLow => "price-low",
            SortOrder::PriceHigh => "price-high",
        })
    }
}

/// Filters and paging for [`CatalogEngine::browse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOptions {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page, clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: usize,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortOrder,
    /// Drop out-of-stock products from the page. Applied after
    /// normalization, so a page may hold fewer than `page_size` items.
    pub only_in_stock: bool,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            category: None,
            sort: SortOrder::Default,
            only_in_stock: false,
        }
    }
}

impl BrowseOptions {
    /// Inclusive row range `(from, to)` addressed by `page` and `page_size`.
    #[must_use]
    pub fn row_range(&self) -> (usize, usize) {
        let size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let from = self.page.max(1).saturating_sub(1).saturating_mul(size);
        (from, from.saturating_add(size - 1))
    }
}

impl<S: ProductSource> CatalogEngine<S> {
    /// One page of `marketplace`'s products with exact total count.
    ///
    /// A backend failure, or a category that cannot be resolved for this
    /// marketplace, yields an empty page.
    pub async fn browse(&self, marketplace: Marketplace, options: &BrowseOptions) -> ProductPage {
        let spec = table_for(marketplace);
        let (from, to) = options.row_range();
        let mut query = Query::table(spec.table).select(spec.select).count_exact();

        if let Some(term) = options.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.ilike_contains(spec.name_column, term);
        }
        if let Some(category) = options
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
        {
            let Some(value) = category_filter_value(marketplace, category) else {
                tracing::debug!(
                    marketplace = %marketplace,
                    category,
                    "category has no code in this marketplace, empty page"
                );
                return ProductPage::default();
            };
            query = query.eq(spec.category_column, value);
        }
        match options.sort {
            SortOrder::Default => {}
            SortOrder::PriceLow => query = query.order(spec.sort_price_column, true),
            SortOrder::PriceHigh => query = query.order(spec.sort_price_column, false),
        }
        let query = query.range(from, to);

        let page = match self.fetch_with_fallback(spec, &query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    marketplace = %marketplace,
                    error = %e,
                    "browse query failed, returning empty page"
                );
                return ProductPage::default();
            }
        };

        let fetched = page.rows.len() as u64;
        let mut items = normalize_rows(marketplace, page.rows);
        if options.only_in_stock {
            items.retain(|p| p.in_stock);
        }
        ProductPage {
            items,
            total: page.total.unwrap_or(fetched),
        }
    }

    /// When `marketplace` was last refreshed, in UTC.
    ///
    /// Reads the newest non-null `last_updated` value and corrects it by the
    /// marketplace's clock offset. Returns `None` when there is no usable
    /// value or the query fails.
    pub async fn last_updated(&self, marketplace: Marketplace) -> Option<DateTime<Utc>> {
        let spec = table_for(marketplace);
        let column = spec.timestamp_column;
        let query = Query::table(spec.table)
            .select(column)
            .not_null(column)
            .order(column, false)
            .limit(1);

        let page = match self.source().fetch_page(&query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    marketplace = %marketplace,
                    error = %e,
                    "last-updated query failed"
                );
                return None;
            }
        };

        let raw = page.rows.first()?.get(column)?.as_str()?;
        let Some(parsed) = parse_timestamp(raw) else {
            tracing::warn!(marketplace = %marketplace, raw, "unparseable last-updated value");
            return None;
        };
        Some(parsed + spec.clock_offset())
    }
}

/// Parses an RFC 3339 timestamp, a Postgres `timestamptz` rendering, or a
/// naive `YYYY-MM-DD HH:MM:SS` value (taken as UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::test_support::FakeSource;

    fn penta_rows(n: usize) -> Vec<serde_json::Value> {
        (0..n)
            .map(|i| {
                json!({
                    "product_id": format!("P{i:03}"),
                    "name": format!("Ürün {i}"),
                    "category_id": if i % 2 == 0 { "01" } else { "10" },
                    "price": (i + 1) as f64 * 10.0,
                    "stock_info": if i % 3 == 0 { "Merkez (0)" } else { "Merkez (2)" },
                    "last_updated": "2025-03-01 12:00:00"
                })
            })
            .collect()
    }

    #[test]
    fn row_range_is_one_based_and_clamped() {
        let opts = BrowseOptions {
            page: 3,
            page_size: 20,
            ..BrowseOptions::default()
        };
        assert_eq!(opts.row_range(), (40, 59));

        let opts = BrowseOptions {
            page: 0,
            page_size: 10_000,
            ..BrowseOptions::default()
        };
        assert_eq!(opts.row_range(), (0, MAX_PAGE_SIZE - 1));

        let opts = BrowseOptions {
            page: 1,
            page_size: 0,
            ..BrowseOptions::default()
        };
        assert_eq!(opts.row_range(), (0, 0));
    }

    #[test]
    fn sort_order_parses_aliases() {
        assert_eq!("price-low".parse::<SortOrder>(), Ok(SortOrder::PriceLow));
        assert_eq!("PRICE_HIGH".parse::<SortOrder>(), Ok(SortOrder::PriceHigh));
        assert_eq!("".parse::<SortOrder>(), Ok(SortOrder::Default));
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[tokio::test]
    async fn browse_returns_page_with_exact_total() {
        let source = FakeSource::new().with_table("bayinet_products", penta_rows(25));
        let engine = CatalogEngine::new(source);
        let opts = BrowseOptions {
            page: 2,
            page_size: 10,
            ..BrowseOptions::default()
        };

        let page = engine.browse(Marketplace::Penta, &opts).await;
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].id, "P010");
    }

    #[tokio::test]
    async fn browse_resolves_penta_category_label() {
        let source = FakeSource::new().with_table("bayinet_products", penta_rows(10));
        let engine = CatalogEngine::new(source);
        let opts = BrowseOptions {
            category: Some("Ağ Ürünleri".to_string()),
            ..BrowseOptions::default()
        };

        let page = engine.browse(Marketplace::Penta, &opts).await;
        assert_eq!(page.total, 5);
        assert!(page.items.iter().all(|p| p.category == "Ağ Ürünleri"));
    }

    #[tokio::test]
    async fn browse_unresolvable_penta_category_is_empty_without_query() {
        let source = FakeSource::new().with_table("bayinet_products", penta_rows(10));
        let engine = CatalogEngine::new(source);
        let opts = BrowseOptions {
            category: Some("Anakart".to_string()),
            ..BrowseOptions::default()
        };

        let page = engine.browse(Marketplace::Penta, &opts).await;
        assert_eq!(page, ProductPage::default());
        assert_eq!(engine.source().query_count("bayinet_products"), 0);
    }

    #[tokio::test]
    async fn browse_sorts_by_marketplace_price_column() {
        let rows = vec![
            json!({ "product_id": "a", "special_price": 30, "list_price": 1 }),
            json!({ "product_id": "b", "special_price": 10 }),
            json!({ "product_id": "c", "special_price": 20 }),
        ];
        let engine = CatalogEngine::new(FakeSource::new().with_table("denge_products", rows));

        let high = BrowseOptions {
            sort: SortOrder::PriceHigh,
            ..BrowseOptions::default()
        };
        let ids: Vec<String> = engine
            .browse(Marketplace::Denge, &high)
            .await
            .items
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn browse_only_in_stock_filters_after_normalization() {
        let source = FakeSource::new().with_table("bayinet_products", penta_rows(9));
        let engine = CatalogEngine::new(source);
        let opts = BrowseOptions {
            only_in_stock: true,
            ..BrowseOptions::default()
        };

        let page = engine.browse(Marketplace::Penta, &opts).await;
        // Total counts rows, not in-stock rows.
        assert_eq!(page.total, 9);
        assert_eq!(page.items.len(), 6);
        assert!(page.items.iter().all(|p| p.in_stock));
    }

    #[tokio::test]
    async fn browse_search_filters_by_name() {
        let rows = vec![
            json!({ "id": 1, "name": "Samsung 980 PRO SSD" }),
            json!({ "id": 2, "name": "Corsair Vengeance RAM" }),
        ];
        let engine = CatalogEngine::new(FakeSource::new().with_table("oksid_products", rows));
        let opts = BrowseOptions {
            search: Some("  ssd ".to_string()),
            ..BrowseOptions::default()
        };

        let page = engine.browse(Marketplace::Oksid, &opts).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "1");
    }

    #[tokio::test]
    async fn browse_penta_falls_back_to_all_columns() {
        let source = FakeSource::new()
            .with_table("bayinet_products", penta_rows(3))
            .rejecting_explicit_select("bayinet_products");
        let engine = CatalogEngine::new(source);

        let page = engine.browse(Marketplace::Penta, &BrowseOptions::default()).await;
        assert_eq!(page.items.len(), 3);
        assert_eq!(engine.source().query_count("bayinet_products"), 2);
    }

    #[tokio::test]
    async fn browse_failure_is_empty_page() {
        let engine = CatalogEngine::new(FakeSource::new().failing_table("denge_products"));
        let page = engine.browse(Marketplace::Denge, &BrowseOptions::default()).await;
        assert_eq!(page, ProductPage::default());
    }

    #[tokio::test]
    async fn last_updated_applies_clock_offset() {
        let source = FakeSource::new()
            .with_table(
                "oksid_products",
                vec![
                    json!({ "id": 1, "last_updated": "2025-03-01 09:00:00" }),
                    json!({ "id": 2, "last_updated": "2025-03-02 15:30:00" }),
                    json!({ "id": 3, "last_updated": null }),
                ],
            )
            .with_table(
                "denge_products",
                vec![json!({ "product_id": "denge_1", "last_updated": "2025-03-02T15:30:00+00:00" })],
            );
        let engine = CatalogEngine::new(source);

        let oksid = engine.last_updated(Marketplace::Oksid).await.unwrap();
        assert_eq!(oksid, Utc.with_ymd_and_hms(2025, 3, 2, 12, 30, 0).unwrap());

        let denge = engine.last_updated(Marketplace::Denge).await.unwrap();
        assert_eq!(denge, Utc.with_ymd_and_hms(2025, 3, 2, 15, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn last_updated_none_when_table_empty_or_failing() {
        let engine = CatalogEngine::new(
            FakeSource::new()
                .with_table("denge_products", Vec::new())
                .failing_table("bayinet_products"),
        );
        assert!(engine.last_updated(Marketplace::Denge).await.is_none());
        assert!(engine.last_updated(Marketplace::Penta).await.is_none());
    }

    #[test]
    fn parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 5, 8, 15, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-05T08:15:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05T11:15:00+03:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05 08:15:00+00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05 08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05T08:15:00.000"), Some(expected));
        assert_eq!(parse_timestamp("dün"), None);
    }
}
