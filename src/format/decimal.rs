//! Decimal display strings: significant digits, subscript notation for tiny
//! values, thousands separators and K/M/B/T abbreviations.

use fastnum::{D256, dec256};
use itertools::Itertools;

use crate::num::{self, AsDecimal, Rounding};

/// Default number of decimal places shown by [`format_significant_string`].
pub const DEFAULT_SIGNIFICANT_PLACES: u32 = 4;

/// Decimal places revealed past the first nonzero digit when the default
/// precision would round a nonzero value to zero.
const REVEALED_PLACES: u32 = 4;

/// Significant digits kept after the zero run in subscript notation.
const TINY_SIGNIFICANT_DIGITS: usize = 4;

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Abbreviation suffixes, largest first, with their power of ten.
const ABBREVIATIONS: [(i32, &str); 4] = [(12, "T"), (9, "B"), (6, "M"), (3, "K")];

/// Position of the first nonzero digit after the decimal point, counting the
/// first fractional digit as 1. Zero for whole numbers and zero itself.
pub fn find_first_non_zero_decimal_index(value: impl AsDecimal) -> usize {
    let plain = num::render_plain(&value.as_decimal());
    plain
        .split_once('.')
        .and_then(|(_, frac)| frac.bytes().position(|b| b != b'0'))
        .map(|pos| pos + 1)
        .unwrap_or(0)
}

/// [`format_significant_string_with`] using 4 places rounded down.
pub fn format_significant_string(value: impl AsDecimal) -> String {
    format_significant_string_with(value, DEFAULT_SIGNIFICANT_PLACES, Rounding::Floor)
}

/// Rounds `value` to `places` decimals; a nonzero value that would round to
/// zero is shown with enough decimals to reveal its leading digits instead.
pub fn format_significant_string_with(
    value: impl AsDecimal,
    places: u32,
    rounding: Rounding,
) -> String {
    let value = value.as_decimal();
    let rounded = num::round_to(value, places, rounding);
    if rounded.is_zero() && !value.is_zero() {
        let places = find_first_non_zero_decimal_index(value) as u32 + REVEALED_PLACES;
        return num::render_plain(&num::round_to(value, places, rounding));
    }
    num::render_plain(&rounded)
}

/// `value` cut to `places` decimals, trailing zeros trimmed.
pub fn to_places_string(value: impl AsDecimal, places: u32, rounding: Rounding) -> String {
    num::render_plain(&num::round_to(value.as_decimal(), places, rounding))
}

/// Compact rendering for values of any magnitude.
///
/// Values below `0.0001` use a subscript for the run of leading fractional
/// zeros, so `0.00001` renders as `0.0₄1`.
pub fn format_tiny_number(value: impl AsDecimal) -> String {
    let value = value.as_decimal();
    if value.is_zero() {
        return "0".to_string();
    }

    let abs = value.abs();
    if abs >= dec256!(1) {
        return format_with_commas(format_significant_string(value));
    }
    if abs >= dec256!(0.0001) {
        return format_significant_string(value);
    }

    let plain = num::render_plain(&abs);
    let frac = plain.split_once('.').map(|(_, f)| f).unwrap_or_default();
    let zeros = frac.bytes().take_while(|b| *b == b'0').count();
    let significant: String = frac[zeros..].chars().take(TINY_SIGNIFICANT_DIGITS).collect();
    let significant = significant.trim_end_matches('0');

    let sign = if value.is_negative() { "-" } else { "" };
    format!("{sign}0.0{}{significant}", subscript(zeros))
}

fn subscript(n: usize) -> String {
    n.to_string()
        .bytes()
        .map(|b| SUBSCRIPT_DIGITS[(b - b'0') as usize])
        .collect()
}

/// Inserts thousands separators into the integer part of a decimal string.
///
/// Sign and fractional part are kept as given; existing separators are
/// dropped first so the output is stable when formatted again. Input that is
/// not a decimal number renders as `"0"`.
pub fn format_with_commas(value: impl AsRef<str>) -> String {
    let raw = value.as_ref().trim();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    let int_part = int_part.replace(',', "");

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(&int_part) || !frac_part.is_none_or(is_digits) {
        return "0".to_string();
    }
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return "0".to_string();
    }

    let grouped = if int_part.is_empty() {
        "0".to_string()
    } else {
        int_part
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .join(",")
    };

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// [`format_abbreviated_number_string_with`] showing one decimal place.
pub fn format_abbreviated_number_string(value: impl AsDecimal) -> String {
    format_abbreviated_number_string_with(value, 1)
}

/// Scales `value` by the largest of K/M/B/T that keeps the mantissa at or
/// above 1 and renders the mantissa with exactly `decimal_places` digits.
pub fn format_abbreviated_number_string_with(value: impl AsDecimal, decimal_places: u32) -> String {
    let value = value.as_decimal();
    let abs = value.abs();
    let (mantissa, suffix) = ABBREVIATIONS
        .iter()
        .map(|(exp, suffix)| (num::pow10(*exp), *suffix))
        .find(|(unit, _)| abs >= *unit)
        .map(|(unit, suffix)| (value / unit, suffix))
        .unwrap_or((value, ""));
    let mantissa = num::render_fixed(mantissa, decimal_places, Rounding::HalfUp);
    format!("{}{suffix}", format_with_commas(mantissa))
}

/// Percentage with two decimals, e.g. `12.35%`.
pub fn format_percent(value: impl AsDecimal) -> String {
    format!(
        "{}%",
        format_with_commas(num::render_fixed(value.as_decimal(), 2, Rounding::HalfUp))
    )
}

/// Returns whether the display string describes a zero value.
pub(crate) fn is_zero_string(value: &str) -> bool {
    num::parse_decimal(value).is_none_or(|d: D256| d.is_zero())
}

#[cfg(test)]
mod tests {
    use fastnum::dec256;

    use super::*;

    #[test]
    fn test_find_first_non_zero_decimal_index() {
        assert_eq!(find_first_non_zero_decimal_index(0.01023123), 2);
        assert_eq!(find_first_non_zero_decimal_index(0.1), 1);
        assert_eq!(find_first_non_zero_decimal_index(12.0), 0);
        assert_eq!(find_first_non_zero_decimal_index(0.0), 0);
        assert_eq!(find_first_non_zero_decimal_index("1.0005"), 4);
        assert_eq!(find_first_non_zero_decimal_index(f64::NAN), 0);
    }

    #[test]
    fn test_format_significant_string() {
        assert_eq!(
            format_significant_string(0.00000000001023123),
            "0.000000000010231"
        );
        assert_eq!(format_significant_string(1.23456789), "1.2345");
        assert_eq!(format_significant_string(0.00012), "0.0001");
        assert_eq!(format_significant_string(0.000012), "0.000012");
        assert_eq!(format_significant_string(1234.5), "1234.5");
        assert_eq!(format_significant_string(0.0), "0");
        assert_eq!(format_significant_string(f64::NAN), "0");
        assert_eq!(format_significant_string(""), "0");
    }

    #[test]
    fn test_format_significant_string_rounding() {
        assert_eq!(
            format_significant_string_with(1.23456, 2, Rounding::Ceil),
            "1.24"
        );
        assert_eq!(
            format_significant_string_with(1.23456, 2, Rounding::Floor),
            "1.23"
        );
        assert_eq!(
            format_significant_string_with(dec256!(0.000000123), 6, Rounding::Floor),
            "0.000000123"
        );
    }

    #[test]
    fn test_format_significant_string_never_zero_for_nonzero() {
        for value in [
            "0.1",
            "0.00001",
            "0.000000000000000001",
            "0.00000000000000000000000000000123",
            "-0.0000005",
            "99999.00001",
        ] {
            let formatted = format_significant_string(value);
            assert!(!is_zero_string(&formatted), "{value} -> {formatted}");
        }
    }

    #[test]
    fn test_format_tiny_number() {
        assert_eq!(format_tiny_number(0.00001), "0.0₄1");
        assert_eq!(format_tiny_number(0.0000012345678), "0.0₅1234");
        assert_eq!(format_tiny_number("0.000000000000102"), "0.0₁₂102");
        assert_eq!(format_tiny_number(-0.00005), "-0.0₄5");
        assert_eq!(format_tiny_number(0.5), "0.5");
        assert_eq!(format_tiny_number(0.00123), "0.0012");
        assert_eq!(format_tiny_number(1234567.891), "1,234,567.891");
        assert_eq!(format_tiny_number(0.0), "0");
        assert_eq!(format_tiny_number(f64::INFINITY), "0");
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas("0"), "0");
        assert_eq!(format_with_commas("123"), "123");
        assert_eq!(format_with_commas("1234"), "1,234");
        assert_eq!(format_with_commas("1234567.891011"), "1,234,567.891011");
        assert_eq!(format_with_commas("-1234567"), "-1,234,567");
        assert_eq!(format_with_commas("1000.00"), "1,000.00");
        assert_eq!(format_with_commas(".5"), "0.5");
        assert_eq!(format_with_commas(""), "0");
        assert_eq!(format_with_commas("12a"), "0");
    }

    #[test]
    fn test_format_with_commas_is_stable() {
        for value in ["1", "1234", "-9876543.21", "100000", "0.000123", "123456789012345678"] {
            let once = format_with_commas(value);
            assert_eq!(format_with_commas(once.replace(',', "")), once);
            assert_eq!(format_with_commas(&once), once);
        }
    }

    #[test]
    fn test_format_abbreviated_number_string() {
        assert_eq!(format_abbreviated_number_string(dec256!(100000000)), "100.0M");
        assert_eq!(format_abbreviated_number_string(999.0), "999.0");
        assert_eq!(format_abbreviated_number_string(1500.0), "1.5K");
        assert_eq!(format_abbreviated_number_string(2_500_000_000.0), "2.5B");
        assert_eq!(format_abbreviated_number_string(1e15), "1,000.0T");
        assert_eq!(format_abbreviated_number_string(-1_250_000.0), "-1.3M");
        assert_eq!(format_abbreviated_number_string_with(12345.0, 2), "12.35K");
        assert_eq!(format_abbreviated_number_string(f64::NAN), "0.0");
    }

    #[test]
    fn test_to_places_string() {
        assert_eq!(to_places_string(1.23456, 3, Rounding::Floor), "1.234");
        assert_eq!(to_places_string(1.23416, 3, Rounding::Ceil), "1.235");
        assert_eq!(to_places_string(2.0, 3, Rounding::Ceil), "2");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(12.345), "12.35%");
        assert_eq!(format_percent(0.0), "0.00%");
    }
}
