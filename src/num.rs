//! Numeric conversions shared by the formatting and market modules.
//!
//! Integer token amounts travel as [`U256`], everything shown to the user
//! is computed on [`D256`] and rendered in plain positional notation.

use alloy_primitives::U256;
use fastnum::{
    D256, bint, dec256,
    decimal::{Context, RoundingMode, Sign},
};

use crate::error::UnitsError;

/// Rounding applied when a decimal is cut to a number of decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rounding {
    /// Towards negative infinity.
    #[default]
    Floor,
    /// Towards positive infinity.
    Ceil,
    /// Towards zero.
    Down,
    /// To nearest, ties away from zero.
    HalfUp,
}

impl Rounding {
    fn mode(self) -> RoundingMode {
        match self {
            Rounding::Floor => RoundingMode::Floor,
            Rounding::Ceil => RoundingMode::Ceiling,
            Rounding::Down => RoundingMode::Down,
            Rounding::HalfUp => RoundingMode::HalfUp,
        }
    }
}

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals as u8
    }

    /// Exact decimal value of an integer amount.
    pub fn from_unsigned(&self, value: U256) -> D256 {
        let unscaled = bint::UInt::<4>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<4>");
        D256::from_parts(
            unscaled,
            -self.decimals,
            Sign::Plus,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    /// Integer amount of a decimal value, dropping digits beyond `decimals`.
    pub fn to_unsigned(&self, value: D256) -> Result<U256, UnitsError> {
        if value.is_negative() && !value.is_zero() {
            return Err(UnitsError::Negative(render_plain(&value)));
        }
        let rescaled = round_to(value, self.decimals as u32, Rounding::Down);
        U256::try_from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
            .ok_or_else(|| UnitsError::Overflow(render_plain(&value)))
    }
}

/// Value that can be coerced into a decimal for display purposes.
///
/// Anything that does not describe a finite number coerces to zero.
pub trait AsDecimal {
    fn as_decimal(&self) -> D256;
}

impl AsDecimal for D256 {
    fn as_decimal(&self) -> D256 {
        if self.is_finite() { *self } else { D256::ZERO }
    }
}

impl AsDecimal for f64 {
    fn as_decimal(&self) -> D256 {
        if !self.is_finite() {
            return D256::ZERO;
        }
        // `Display` for f64 is the shortest round-trip form, never exponential.
        parse_decimal(&self.to_string()).unwrap_or(D256::ZERO)
    }
}

impl AsDecimal for u64 {
    fn as_decimal(&self) -> D256 {
        D256::from(*self)
    }
}

impl AsDecimal for str {
    fn as_decimal(&self) -> D256 {
        parse_decimal(self).unwrap_or(D256::ZERO)
    }
}

impl AsDecimal for String {
    fn as_decimal(&self) -> D256 {
        self.as_str().as_decimal()
    }
}

impl<T: AsDecimal + ?Sized> AsDecimal for &T {
    fn as_decimal(&self) -> D256 {
        (**self).as_decimal()
    }
}

/// Parses a plain decimal string, rejecting empty input and non-finite values.
pub fn parse_decimal(value: &str) -> Option<D256> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    D256::from_str(value, Context::default())
        .ok()
        .filter(|d| d.is_finite())
}

/// Cuts `value` to `places` decimal places.
///
/// Directed modes step a whole unit away from the truncated value whenever
/// any dropped digit is nonzero, not only the first one.
pub fn round_to(value: D256, places: u32, rounding: Rounding) -> D256 {
    match rounding {
        Rounding::Down | Rounding::HalfUp => rescale(value, places, rounding),
        Rounding::Floor | Rounding::Ceil => {
            let truncated = rescale(value, places, Rounding::Down);
            let away_from_zero = match rounding {
                Rounding::Floor => value.is_negative(),
                _ => !value.is_negative(),
            };
            if truncated == value || !away_from_zero {
                return truncated;
            }
            let unit = pow10(-(places as i32));
            let stepped = if value.is_negative() {
                truncated - unit
            } else {
                truncated + unit
            };
            rescale(stepped, places, Rounding::Down)
        }
    }
}

/// Like [`round_to`], where a negative `places` rounds to tens, hundreds
/// and so on.
pub fn round_to_places(value: D256, places: i32, rounding: Rounding) -> D256 {
    if places >= 0 {
        return round_to(value, places as u32, rounding);
    }
    let unit = pow10(-places);
    round_to(value / unit, 0, rounding) * unit
}

fn rescale(value: D256, places: u32, rounding: Rounding) -> D256 {
    let sign = if value.is_negative() {
        Sign::Minus
    } else {
        Sign::Plus
    };
    D256::from_parts(
        value.digits(),
        -(value.fractional_digits_count() as i32),
        sign,
        Context::default().with_rounding_mode(rounding.mode()),
    )
    .rescale(places as i16)
}

/// Renders the exact value in positional notation, without trailing
/// fractional zeros.
pub fn render_plain(value: &D256) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let digits = value.digits().to_string();
    if digits.bytes().all(|b| b == b'0') {
        return "0".to_string();
    }

    let scale = value.fractional_digits_count() as i64;
    let body = if scale <= 0 {
        format!("{digits}{}", "0".repeat((-scale) as usize))
    } else {
        let scale = scale as usize;
        let (int_part, frac_part) = if digits.len() > scale {
            let (i, f) = digits.split_at(digits.len() - scale);
            (i.to_string(), f.to_string())
        } else {
            ("0".to_string(), format!("{}{digits}", "0".repeat(scale - digits.len())))
        };
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            int_part
        } else {
            format!("{int_part}.{frac_part}")
        }
    };

    if value.is_negative() {
        format!("-{body}")
    } else {
        body
    }
}

/// Renders `value` rounded to exactly `places` decimal places.
pub fn render_fixed(value: D256, places: u32, rounding: Rounding) -> String {
    let plain = render_plain(&round_to(value, places, rounding));
    if places == 0 {
        return plain;
    }
    let frac_len = plain.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
    let padding = "0".repeat(places as usize - frac_len);
    if frac_len == 0 {
        format!("{plain}.{padding}")
    } else {
        format!("{plain}{padding}")
    }
}

/// Lossy conversion for the few places that need floating-point math.
pub fn to_f64(value: &D256) -> f64 {
    render_plain(value).parse().unwrap_or(0.0)
}

/// `10^exp` as an exact decimal.
pub fn pow10(exp: i32) -> D256 {
    let ten = dec256!(10);
    let mut result = dec256!(1);
    for _ in 0..exp.unsigned_abs() {
        if exp > 0 {
            result = result * ten;
        } else {
            result = result / ten;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use fastnum::dec256;

    use super::*;

    #[test]
    fn test_numeric_converter_from_unsigned() {
        assert_eq!(
            Converter::new(0).from_unsigned(U256::from(1234567890)),
            dec256!(1234567890)
        );
        assert_eq!(
            Converter::new(6).from_unsigned(U256::from(1234567890)),
            dec256!(1234.56789)
        );
        assert_eq!(
            Converter::new(18).from_unsigned(U256::from(1234567890)),
            dec256!(0.00000000123456789)
        );
    }

    #[test]
    fn test_numeric_converter_to_unsigned() {
        assert_eq!(
            Converter::new(6).to_unsigned(dec256!(1234.56789)),
            Ok(U256::from(1234567890))
        );
        assert_eq!(
            Converter::new(2).to_unsigned(dec256!(1.239)),
            Ok(U256::from(123))
        );
        assert!(matches!(
            Converter::new(6).to_unsigned(dec256!(-1)),
            Err(UnitsError::Negative(_))
        ));
    }

    #[test]
    fn test_as_decimal_coerces_invalid_input_to_zero() {
        assert_eq!(f64::NAN.as_decimal(), D256::ZERO);
        assert_eq!(f64::INFINITY.as_decimal(), D256::ZERO);
        assert_eq!("".as_decimal(), D256::ZERO);
        assert_eq!("abc".as_decimal(), D256::ZERO);
        assert_eq!(0.25f64.as_decimal(), dec256!(0.25));
        assert_eq!("12.5".as_decimal(), dec256!(12.5));
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(render_plain(&dec256!(0)), "0");
        assert_eq!(render_plain(&dec256!(1.500)), "1.5");
        assert_eq!(render_plain(&dec256!(-0.00012)), "-0.00012");
        assert_eq!(render_plain(&dec256!(1200)), "1200");
        assert_eq!(
            render_plain(&dec256!(0.00000000001023123)),
            "0.00000000001023123"
        );
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(dec256!(1.239), 2, Rounding::Floor), dec256!(1.23));
        assert_eq!(round_to(dec256!(1.231), 2, Rounding::Ceil), dec256!(1.24));
        assert_eq!(round_to(dec256!(-1.231), 2, Rounding::Floor), dec256!(-1.24));
        assert_eq!(round_to(dec256!(-1.239), 2, Rounding::Down), dec256!(-1.23));
        assert_eq!(round_to(dec256!(1.235), 2, Rounding::HalfUp), dec256!(1.24));
        assert_eq!(round_to(dec256!(1.20), 2, Rounding::Ceil), dec256!(1.2));
    }

    #[test]
    fn test_round_to_looks_past_first_dropped_digit() {
        assert_eq!(round_to(dec256!(1.0001), 2, Rounding::Ceil), dec256!(1.01));
        assert_eq!(round_to(dec256!(1.00005), 2, Rounding::Ceil), dec256!(1.01));
        assert_eq!(
            round_to(dec256!(1) / dec256!(1.0001), 2, Rounding::Ceil),
            dec256!(1)
        );
        assert_eq!(round_to(dec256!(0.9999), 0, Rounding::Ceil), dec256!(1));
        assert_eq!(round_to(dec256!(-1.0001), 2, Rounding::Floor), dec256!(-1.01));
        assert_eq!(round_to(dec256!(-1.0001), 2, Rounding::Ceil), dec256!(-1));
        assert_eq!(round_to(dec256!(1.0009), 2, Rounding::Floor), dec256!(1));
    }

    #[test]
    fn test_round_to_places_negative() {
        assert_eq!(round_to_places(dec256!(123456), -2, Rounding::Floor), dec256!(123400));
        assert_eq!(round_to_places(dec256!(123401), -2, Rounding::Ceil), dec256!(123500));
        assert_eq!(round_to_places(dec256!(1.239), 2, Rounding::Floor), dec256!(1.23));
    }

    #[test]
    fn test_render_fixed_pads() {
        assert_eq!(render_fixed(dec256!(100), 1, Rounding::HalfUp), "100.0");
        assert_eq!(render_fixed(dec256!(1.5), 3, Rounding::HalfUp), "1.500");
        assert_eq!(render_fixed(dec256!(1.5), 0, Rounding::Floor), "1");
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(3), dec256!(1000));
        assert_eq!(pow10(-2), dec256!(0.01));
        assert_eq!(pow10(0), dec256!(1));
    }
}
