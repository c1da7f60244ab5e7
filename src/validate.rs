//! Validation of free-form user input into amounts and currency codes.
//!
//! Both validators return `Option` rather than an error: "not a valid
//! amount" is an expected answer during the interactive loop, not a
//! failure to propagate.

/// Parses `text` as a monetary amount with at most two decimal places.
///
/// The precision check runs against the textual form, not the parsed
/// value, so `"1.005"` is rejected even though it would round to two
/// decimals without visible loss. Valid amounts are returned rounded to
/// two decimal places.
pub fn validate_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if let Some((_, fractional)) = text.split_once('.') {
        if fractional.len() > 2 {
            return None;
        }
    }
    Some((value * 100.0).round() / 100.0)
}

/// Accepts exactly three alphabetic characters, normalized to uppercase.
pub fn validate_currency_code(text: &str) -> Option<String> {
    let text = text.trim();
    if text.chars().count() == 3 && text.chars().all(char::is_alphabetic) {
        Some(text.to_uppercase())
    } else {
        None
    }
}
