//! Penta category codes and their display labels.
//!
//! Penta rows carry a two-digit code instead of a category name. Known codes
//! map to a fixed label; unknown codes display as `"Diğer (NN)"` so two
//! different unknown codes never collapse into one bucket.

use std::sync::LazyLock;

use cps_core::products::DEFAULT_CATEGORY;
use regex::Regex;

const PENTA_CATEGORIES: [(&str, &str); 13] = [
    ("01", "Bilgisayar Bileşenleri"),
    ("02", "Kişisel Bilgisayar"),
    ("03", "Çevre Birimleri"),
    ("04", "Baskı Çözümleri"),
    ("05", "Kurumsal Ürünler"),
    ("07", "Tüketici Elektroniği"),
    ("08", "Aksesuar ve Sarf"),
    ("09", "Diğer"),
    ("10", "Ağ Ürünleri"),
    ("11", "Güvenlik Ürünleri"),
    ("12", "Taşınabilir Depolama"),
    ("15", "Yazılım"),
    ("17", "Servis Hizmetleri"),
];

static TRAILING_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)$").expect("valid regex"));

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Left-pads a numeric code to two digits: `"1"` becomes `"01"`.
#[must_use]
pub fn pad_code(code: &str) -> String {
    format!("{code:0>2}")
}

/// Label of a known code, after zero-padding.
#[must_use]
pub fn label_for_code(code: &str) -> Option<&'static str> {
    let padded = pad_code(code.trim());
    PENTA_CATEGORIES
        .iter()
        .find(|(c, _)| *c == padded)
        .map(|(_, label)| *label)
}

/// Display label for a raw Penta category value.
///
/// Codes resolve through the table (unknown ones become `"Diğer (NN)"`),
/// non-numeric values are already labels and pass through, and an empty
/// value becomes `"Diğer"`.
#[must_use]
pub fn display_label(raw: Option<&str>) -> String {
    let value = raw.unwrap_or_default().trim();
    if value.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }
    if !is_digits(value) {
        return value.to_string();
    }
    let code = pad_code(value);
    match label_for_code(&code) {
        Some(label) => label.to_string(),
        None => format!("{DEFAULT_CATEGORY} ({code})"),
    }
}

/// Resolves a category label, as shown to users, back to its Penta code.
///
/// Accepts an exact label, the `"Diğer (NN)"` form, or a bare code. Returns
/// `None` for anything else, including blank input and `"all"`.
#[must_use]
pub fn code_for_label(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label.eq_ignore_ascii_case("all") {
        return None;
    }
    if let Some((code, _)) = PENTA_CATEGORIES.iter().find(|(_, l)| *l == label) {
        return Some((*code).to_string());
    }
    if let Some(caps) = TRAILING_CODE_RE.captures(label) {
        return caps.get(1).map(|m| pad_code(m.as_str()));
    }
    is_digits(label).then(|| pad_code(label))
}
