use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::error::CoreError;

/// Converts an indicator output (`f64`) into a `Decimal`.
///
/// NaN and infinities are rejected rather than silently mapped to zero.
pub fn to_decimal(name: &str, value: f64) -> Result<Decimal, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::InvalidInput(name.to_string(), value.to_string()));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| CoreError::Calculation(format!("{name} value {value} does not fit a Decimal")))
}

/// Converts a `Decimal` price into the `f64` domain used by `ta` and the ML features.
pub fn to_f64(name: &str, value: Decimal) -> Result<f64, CoreError> {
    value
        .to_f64()
        .ok_or_else(|| CoreError::Calculation(format!("{name} value {value} does not fit an f64")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_finite_indicator_values() {
        assert!(to_decimal("atr", f64::NAN).is_err());
        assert!(to_decimal("rsi", f64::INFINITY).is_err());
        assert_eq!(to_decimal("rsi", 50.0), Ok(dec!(50)));
        assert_eq!(to_f64("close", dec!(12.5)), Ok(12.5));
    }
}
