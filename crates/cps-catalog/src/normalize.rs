//! Per-marketplace normalization of raw rows into [`cps_core::Product`].
//!
//! Each marketplace has one [`Normalizer`] implementation selected by
//! [`Marketplace`]; nothing here sniffs field names at runtime. Normalizers
//! never fail: a missing or malformed field degrades to a documented default.

use cps_core::products::{DEFAULT_CATEGORY, DEFAULT_CURRENCY, MISSING_URL, UNNAMED_PRODUCT};
use cps_core::{Marketplace, Product};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::category_codes;
use crate::price_format::{format_tr, with_currency};
use crate::raw::{DengeRow, OksidRow, PentaRow};
use crate::stock::{denge_in_stock, oksid_in_stock, penta_in_stock};

/// Maps one marketplace's raw row to the canonical product.
pub trait Normalizer {
    type Row: DeserializeOwned + Default;
    const MARKETPLACE: Marketplace;

    fn normalize(row: Self::Row) -> Product;

    /// Decodes a JSON row; a row that cannot be decoded at all is treated
    /// as one with every field absent.
    fn decode(value: Value) -> Self::Row {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::debug!(
                marketplace = %Self::MARKETPLACE,
                error = %e,
                "undecodable row, using empty row"
            );
            Self::Row::default()
        })
    }
}

pub struct OksidNormalizer;
pub struct PentaNormalizer;
pub struct DengeNormalizer;

impl Normalizer for OksidNormalizer {
    type Row = OksidRow;
    const MARKETPLACE: Marketplace = Marketplace::Oksid;

    fn normalize(row: OksidRow) -> Product {
        Product {
            id: row.id.unwrap_or_default(),
            name: name_or_placeholder(row.name),
            price: first_price(&[row.price_1, row.price_2]),
            currency: currency_or_default(row.currency),
            price_text: None,
            category: non_blank(row.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            in_stock: oksid_in_stock(row.stock.as_deref()),
            marketplace: Self::MARKETPLACE,
            url: url_or_sentinel(row.url),
            description: non_blank(row.description),
            last_price: positive(row.last_price),
        }
    }
}

impl Normalizer for PentaNormalizer {
    type Row = PentaRow;
    const MARKETPLACE: Marketplace = Marketplace::Penta;

    fn normalize(row: PentaRow) -> Product {
        let category = category_codes::display_label(row.category_value());
        let price_text = row
            .price
            .map(|p| with_currency(&format_tr(p), row.currency.as_deref()));
        Product {
            id: non_blank(row.product_id)
                .or_else(|| non_blank(row.id))
                .unwrap_or_default(),
            name: name_or_placeholder(row.name),
            price: first_price(&[row.price]),
            currency: currency_or_default(row.currency),
            price_text,
            category,
            in_stock: penta_in_stock(row.stock_info.as_deref()),
            marketplace: Self::MARKETPLACE,
            url: url_or_sentinel(row.url),
            description: non_blank(row.description),
            last_price: positive(row.last_price),
        }
    }
}

impl Normalizer for DengeNormalizer {
    type Row = DengeRow;
    const MARKETPLACE: Marketplace = Marketplace::Denge;

    fn normalize(row: DengeRow) -> Product {
        let price_text = positive(row.special_price)
            .map(|p| with_currency(&p.to_string(), row.currency.as_deref()));
        Product {
            id: non_blank(row.product_id)
                .or_else(|| non_blank(row.id))
                .unwrap_or_default(),
            name: name_or_placeholder(row.name),
            price: first_price(&[row.special_price, row.list_price]),
            currency: currency_or_default(row.currency),
            price_text,
            category: non_blank(row.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            in_stock: denge_in_stock(row.stock_info.as_deref()),
            marketplace: Self::MARKETPLACE,
            url: url_or_sentinel(row.url),
            description: non_blank(row.description),
            last_price: positive(row.last_price),
        }
    }
}

fn normalize_with<N: Normalizer>(value: Value) -> Product {
    N::normalize(N::decode(value))
}

/// Normalizes one raw row from `marketplace`'s table.
#[must_use]
pub fn normalize_row(marketplace: Marketplace, value: Value) -> Product {
    match marketplace {
        Marketplace::Oksid => normalize_with::<OksidNormalizer>(value),
        Marketplace::Penta => normalize_with::<PentaNormalizer>(value),
        Marketplace::Denge => normalize_with::<DengeNormalizer>(value),
    }
}

#[must_use]
pub fn normalize_rows(marketplace: Marketplace, rows: Vec<Value>) -> Vec<Product> {
    rows.into_iter()
        .map(|row| normalize_row(marketplace, row))
        .collect()
}

/// First candidate that is a usable price, else `0.0`.
fn first_price(candidates: &[Option<f64>]) -> f64 {
    candidates
        .iter()
        .find_map(|c| positive(*c))
        .unwrap_or(0.0)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn name_or_placeholder(name: Option<String>) -> String {
    non_blank(name).unwrap_or_else(|| UNNAMED_PRODUCT.to_string())
}

fn currency_or_default(currency: Option<String>) -> String {
    non_blank(currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn url_or_sentinel(url: Option<String>) -> String {
    non_blank(url).unwrap_or_else(|| MISSING_URL.to_string())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
