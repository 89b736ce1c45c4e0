//! Stock-availability parsing, one rule per marketplace.
//!
//! The marketplaces disagree on the default: Oksid and Penta treat a missing
//! or unreadable value as in stock, Denge treats it as out of stock. Each
//! rule lives in its own function so the defaults can be aligned in one place.

use std::sync::LazyLock;

use regex::Regex;

/// Lower-cased phrases that mean "not in stock".
const OUT_OF_STOCK_PHRASES: [&str; 12] = [
    "0",
    "false",
    "no",
    "hayir",
    "hayır",
    "yok",
    "out",
    "stok yok",
    "stokta yok",
    "yoktur",
    "stok bulunmamaktadır",
    "mevcut değil",
];

/// A depot count in ASCII or full-width parentheses: `(13)` or `（13）`.
static DEPOT_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（](\d+)[)）]").expect("valid regex"));

fn is_out_of_stock_phrase(normalized: &str) -> bool {
    OUT_OF_STOCK_PHRASES.contains(&normalized)
}

/// Oksid: free text; in stock unless it is a known negative phrase.
/// Empty counts as in stock.
#[must_use]
pub fn oksid_in_stock(raw: Option<&str>) -> bool {
    let normalized = raw.unwrap_or_default().trim().to_lowercase();
    normalized.is_empty() || !is_out_of_stock_phrase(&normalized)
}

/// Penta: `"<depot> (<count>)| <depot> (<count>)| ..."`.
///
/// In stock iff the summed depot counts are positive. Empty input, or input
/// with no readable count at all, counts as in stock.
#[must_use]
pub fn penta_in_stock(raw: Option<&str>) -> bool {
    let text = raw.unwrap_or_default().trim();
    if text.is_empty() {
        return true;
    }

    let counts: Vec<u64> = text
        .split('|')
        .filter_map(|depot| DEPOT_COUNT_RE.captures(depot.trim()))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .collect();

    if counts.is_empty() {
        return true;
    }
    counts.into_iter().fold(0u64, u64::saturating_add) > 0
}

/// Denge: a unit count, in stock iff positive. Non-numeric text falls back to
/// the negative-phrase match; empty counts as out of stock.
#[must_use]
pub fn denge_in_stock(raw: Option<&str>) -> bool {
    let normalized = raw.unwrap_or_default().trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    match normalized.parse::<f64>() {
        Ok(count) if !count.is_nan() => count > 0.0,
        _ => !is_out_of_stock_phrase(&normalized),
    }
}
