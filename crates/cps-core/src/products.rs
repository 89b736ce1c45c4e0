use serde::{Deserialize, Serialize};

use crate::Marketplace;

/// Placeholder shown when a row carries no usable name.
pub const UNNAMED_PRODUCT: &str = "İsimsiz Ürün";
/// Currency symbol assumed when a row carries none.
pub const DEFAULT_CURRENCY: &str = "₺";
/// Link used when a row carries no product URL.
pub const MISSING_URL: &str = "#";
/// Category assigned when a row carries none.
pub const DEFAULT_CATEGORY: &str = "Diğer";

/// A marketplace row normalized into the source-agnostic shape every
/// search, browse and comparison result uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Source-local identifier, always a string regardless of the column type.
    pub id: String,
    pub name: String,
    /// Always finite; absent prices normalize to `0.0`.
    pub price: f64,
    pub currency: String,
    /// Pre-formatted price for display, when the source provides one.
    pub price_text: Option<String>,
    pub category: String,
    pub in_stock: bool,
    pub marketplace: Marketplace,
    pub url: String,
    pub description: Option<String>,
    /// Previously observed price. Display-only, not a price history.
    pub last_price: Option<f64>,
}

impl Product {
    /// Difference between the current and the previously observed price.
    ///
    /// Returns `None` when there is no previous price to compare against.
    #[must_use]
    pub fn price_change(&self) -> Option<f64> {
        self.last_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|last| self.price - last)
    }

    /// `true` when the product has a usable (positive) price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }
}

/// One page of a per-marketplace listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    /// Total rows matching the filters, across all pages.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(price: f64, last_price: Option<f64>) -> Product {
        Product {
            id: "42".to_string(),
            name: "Kingston 16GB DDR4".to_string(),
            price,
            currency: "USD".to_string(),
            price_text: None,
            category: "Bilgisayar Bileşenleri".to_string(),
            in_stock: true,
            marketplace: Marketplace::Penta,
            url: MISSING_URL.to_string(),
            description: None,
            last_price,
        }
    }

    #[test]
    fn price_change_none_without_last_price() {
        assert!(make_product(100.0, None).price_change().is_none());
    }

    #[test]
    fn price_change_none_when_last_price_is_zero() {
        assert!(make_product(100.0, Some(0.0)).price_change().is_none());
    }

    #[test]
    fn price_change_is_current_minus_last() {
        let change = make_product(90.0, Some(100.0)).price_change().unwrap();
        assert!((change + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn has_price_false_for_zero() {
        assert!(!make_product(0.0, None).has_price());
        assert!(make_product(0.5, None).has_price());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(make_product(10.0, Some(12.0))).unwrap();
        assert_eq!(json["inStock"], true);
        assert_eq!(json["lastPrice"], 12.0);
        assert_eq!(json["marketplace"], "penta");
        assert!(json.get("in_stock").is_none());
    }
}
