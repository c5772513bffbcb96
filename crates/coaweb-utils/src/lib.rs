//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a monetary amount for display.
///
/// Rounds half-away-from-zero to `decimal_places`, groups the integer part
/// with `thousands_sep` and joins the fraction with `decimal_sep`.
/// For example `1234567.891` with 2 places, `","` and `"."` gives
/// `1,234,567.89`; with `"."` and `","` it gives `1.234.567,89`.
pub fn format_amount(value: Decimal, decimal_places: u32, thousands_sep: &str, decimal_sep: &str) -> String {
    let rounded = value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimal_places as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push_str(thousands_sep);
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}{}{}", sign, grouped, decimal_sep, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Percentage of `part` against `whole`, `None` when `whole` is zero
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Add two amounts, clamping at `Decimal::MAX` / `Decimal::MIN`.
///
/// The flag is true when the exact sum was out of range.
pub fn saturating_add(a: Decimal, b: Decimal) -> (Decimal, bool) {
    match a.checked_add(b) {
        Some(sum) => (sum, false),
        None if b.is_sign_negative() => (Decimal::MIN, true),
        None => (Decimal::MAX, true),
    }
}

/// Subtract `b` from `a`, clamping like [`saturating_add`]
pub fn saturating_sub(a: Decimal, b: Decimal) -> (Decimal, bool) {
    saturating_add(a, -b)
}
