//! Raw row shapes of the three marketplace tables.
//!
//! Every field is optional and decoded leniently: the scrapers that fill
//! these tables write numbers as JSON numbers or as text (with either `.` or
//! `,` as the decimal separator), and ids as integers or strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Row of `oksid_products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OksidRow {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub price_1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub price_2: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub stock: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub last_price: Option<f64>,
}

/// Row of `bayinet_products` (the Penta marketplace).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PentaRow {
    #[serde(deserialize_with = "lenient_string")]
    pub product_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    /// Numeric category code such as `"01"`.
    #[serde(deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(rename = "categoryCode", deserialize_with = "lenient_string")]
    pub category_code: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    /// Per-depot stock, e.g. `"Merkez (0)| Dış Depo (13)"`.
    #[serde(deserialize_with = "lenient_string")]
    pub stock_info: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub last_price: Option<f64>,
}

impl PentaRow {
    /// The category code, whichever column carried it.
    #[must_use]
    pub fn category_value(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .or(self.category.as_deref())
            .or(self.category_code.as_deref())
    }
}

/// Row of `denge_products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DengeRow {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub product_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub special_price: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub list_price: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    /// Usually a unit count; older rows carry free text.
    #[serde(deserialize_with = "lenient_string")]
    pub stock_info: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub last_price: Option<f64>,
}

/// Renders a scalar JSON value as text. Arrays, objects and `null` yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses a decimal written with `.` or `,` as separator.
///
/// `"1.234,50"` is read as Turkish grouping (1234.5). Non-finite results are
/// rejected.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let canonical = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    canonical.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_decimal(&s),
            _ => None,
        })
        .filter(|n| n.is_finite()))
}
