//! Integer token amounts: unit conversion and percentage math.

use alloy_primitives::U256;

use super::decimal::format_with_commas;
use crate::{
    error::UnitsError,
    num::{self, AsDecimal, Converter, Rounding},
};

/// Digits of fixed-point precision used by [`apply_percent`].
pub const DEFAULT_PERCENT_PRECISION: u32 = 5;

/// USD value a displayed amount must be able to resolve.
const HALF_CENT: f64 = 0.005;

/// Decimal string of an integer `value` with `decimals`, at full precision.
pub fn format_units(value: U256, decimals: u8, price: Option<f64>) -> String {
    format_units_with(value, decimals, price, |s| s)
}

/// Like [`format_units`], passing the result through `formatter`.
///
/// With a `price`, the amount is cut (rounded down) to the smallest even
/// number of decimals that still resolves half a cent of value.
pub fn format_units_with<F>(value: U256, decimals: u8, price: Option<f64>, formatter: F) -> String
where
    F: FnOnce(String) -> String,
{
    let amount = Converter::new(decimals).from_unsigned(value);
    let formatted = match price {
        Some(price) => num::render_plain(&num::round_to(
            amount,
            half_cent_precision(price),
            Rounding::Floor,
        )),
        None => num::render_plain(&amount),
    };
    formatter(formatted)
}

/// Even number of decimals needed for half a cent of value to be visible at `price`.
pub fn half_cent_precision(price: f64) -> u32 {
    if !price.is_finite() || price <= 0.0 {
        return 0;
    }
    let digits = (-(HALF_CENT / price).log10()).max(0.0);
    ((digits / 2.0).floor() * 2.0) as u32
}

/// Integer amount of a decimal string with `decimals`, extra digits dropped.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let parsed = num::parse_decimal(value).ok_or_else(|| UnitsError::Invalid(value.to_string()))?;
    Converter::new(decimals).to_unsigned(parsed)
}

/// [`apply_percent_with`] at the default precision.
pub fn apply_percent(amount: U256, percent: f64) -> U256 {
    apply_percent_with(amount, percent, DEFAULT_PERCENT_PRECISION)
}

/// `amount * percent / 100`, computed on integers.
///
/// `percent` is fixed to `precision_digits` fractional digits first. Non-finite
/// or negative percentages yield zero.
pub fn apply_percent_with(amount: U256, percent: f64, precision_digits: u32) -> U256 {
    if !percent.is_finite() || percent <= 0.0 {
        return U256::ZERO;
    }
    let precision = 10f64.powi(precision_digits as i32);
    let scaled = U256::from((percent * precision).round() as u128);
    let denominator = U256::from(100u64) * U256::from(10u64).pow(U256::from(precision_digits));

    match amount.checked_mul(scaled) {
        Some(product) => product / denominator,
        None => {
            // amount = q * d + r, so amount * s / d = q * s + r * s / d exactly.
            let quotient = amount / denominator;
            let remainder = amount % denominator;
            quotient
                .saturating_mul(scaled)
                .saturating_add(remainder * scaled / denominator)
        }
    }
}

/// USD value of an integer amount, e.g. `$1,234.56`.
///
/// Nonzero values below one cent render as `<$0.01`.
pub fn format_dollar_value(value: U256, decimals: u8, price: f64) -> String {
    let usd = Converter::new(decimals).from_unsigned(value) * price.as_decimal();
    let cents = num::round_to(usd, 2, Rounding::Floor);
    if cents.is_zero() && !usd.is_zero() {
        return "<$0.01".to_string();
    }
    format!(
        "${}",
        format_with_commas(num::render_fixed(cents, 2, Rounding::Floor))
    )
}
