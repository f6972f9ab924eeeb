use std::str::FromStr;

use rust_decimal::Decimal;

/// Converts a JSON float to a decimal using its shortest round-trip
/// representation, so `3.6` becomes exactly `3.6`.
/// Returns `None` for NaN, infinities and values outside the decimal range.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}
