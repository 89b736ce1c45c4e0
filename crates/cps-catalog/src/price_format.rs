//! Display strings for prices.

/// Formats an amount the Turkish way: `.` groups thousands, `,` separates two
/// fraction digits. `1234.5` becomes `"1.234,50"`.
#[must_use]
pub fn format_tr(amount: f64) -> String {
    if !amount.is_finite() {
        return "0,00".to_string();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped},{fraction:02}")
}

/// Joins an amount and an optional currency, dropping the separator when
/// there is no currency.
#[must_use]
pub fn with_currency(amount: &str, currency: Option<&str>) -> String {
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("{amount} {c}"),
        None => amount.to_string(),
    }
}
