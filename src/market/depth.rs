use std::collections::HashMap;

use fastnum::{D256, dec256};
use itertools::Itertools;
use tracing::warn;

use super::{Depth, Market, PriceBook};
use crate::{
    error::DepthError,
    format::{self, find_first_non_zero_decimal_index},
    num::{self, AsDecimal, Rounding},
    types::OrderSide,
};

/// Price ratio between adjacent ticks, used to derive a natural resolution.
pub const DEFAULT_TICK_RATIO: D256 = dec256!(1.0001);

/// Upper bound on the number of depth resolutions offered.
pub const MAX_DECIMAL_CANDIDATES: usize = 4;

/// One aggregated order book row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DepthLevel {
    pub price: String,
    pub size: String,
}

/// A selectable depth resolution.
///
/// `value` counts decimal places; negative values group by tens, hundreds
/// and so on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecimalPlaces {
    /// Smallest price step at this resolution, e.g. `"0.01"` or `"100"`.
    pub label: String,
    pub value: i32,
}

impl DecimalPlaces {
    pub fn new(value: i32) -> Self {
        let label = if value > 0 {
            format!("0.{}1", "0".repeat(value as usize - 1))
        } else {
            format!("1{}", "0".repeat(value.unsigned_abs() as usize))
        };
        Self { label, value }
    }
}

/// Collapses one side of `market` into rows at `decimal_places` resolution.
///
/// Levels are re-priced from their tick, sorted away from the spread by
/// that price, rounded in the direction that never favours the user and
/// merged when they land on the same display price. A merged row keeps the
/// position of its first level. Rows whose price rounds to zero are dropped.
pub fn parse_depth<B: PriceBook>(
    market: &Market,
    side: OrderSide,
    decimal_places: i32,
    book: &B,
) -> Result<Vec<DepthLevel>, DepthError> {
    let rounding = side.conservative_rounding();
    let priced: Vec<(D256, &Depth)> = market
        .depth(side)
        .iter()
        .map(|level| -> Result<_, DepthError> { Ok((book.tick_price(level.tick, side)?, level)) })
        .collect::<Result<_, _>>()?;
    let levels = priced.into_iter().sorted_by(|(a, _), (b, _)| match side {
        OrderSide::Bid => b.cmp(a),
        OrderSide::Ask => a.cmp(b),
    });

    let mut rows: Vec<(String, D256)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (price, level) in levels {
        let key = price_string(price, decimal_places, rounding);
        if format::is_zero_string(&key) {
            continue;
        }
        let size = num::parse_decimal(&level.base_amount).ok_or_else(|| {
            DepthError::InvalidAmount {
                tick: level.tick,
                amount: level.base_amount.clone(),
            }
        })?;

        match index.get(&key) {
            Some(&i) => rows[i].1 = rows[i].1 + size,
            None => {
                index.insert(key.clone(), rows.len());
                rows.push((key, size));
            }
        }
    }

    let size_places = market.quote.decimals as u32;
    Ok(rows
        .into_iter()
        .map(|(price, size)| DepthLevel {
            price,
            size: format::format_significant_string_with(size, size_places, Rounding::Floor),
        })
        .collect())
}

/// Decimal places needed to tell `price` apart from the next tick at `ratio`.
pub fn get_price_decimals(price: impl AsDecimal, ratio: impl AsDecimal) -> u32 {
    let price = price.as_decimal();
    let step = price * ratio.as_decimal() - price;
    find_first_non_zero_decimal_index(step.abs()) as u32 + 1
}

/// Depth resolutions for a book whose tightest price is `min_price`, finest
/// first.
///
/// Starts at the tick-implied resolution and coarsens one decimal at a time
/// while the price still spans more than one step, so every candidate
/// changes the visible rounding.
pub fn decimal_place_candidates(min_price: impl AsDecimal) -> Vec<DecimalPlaces> {
    let min_price = min_price.as_decimal();
    if min_price.is_zero() || min_price.is_negative() {
        return Vec::new();
    }
    let finest = get_price_decimals(min_price, DEFAULT_TICK_RATIO) as i32;
    (0..MAX_DECIMAL_CANDIDATES as i32)
        .map(|i| finest - i)
        .take_while(|value| min_price > num::pow10(-value))
        .map(DecimalPlaces::new)
        .collect()
}

/// Display string of a limit price at `decimal_places`.
///
/// The price is snapped to its achievable tick first, then rounded down for
/// bids and up for asks. If the tick lookup fails the raw price is rounded
/// the same way.
pub fn format_price_string<B: PriceBook>(
    book: &B,
    price: impl AsDecimal,
    decimal_places: i32,
    side: OrderSide,
) -> String {
    let price = price.as_decimal();
    let rounding = side.conservative_rounding();
    match book.price_neighborhood(price, side) {
        Ok(neighborhood) => price_string(neighborhood.price, decimal_places, rounding),
        Err(err) => {
            warn!(
                %err,
                price = %num::render_plain(&price),
                ?side,
                "price neighborhood lookup failed, rounding raw price"
            );
            price_string(price, decimal_places, rounding)
        }
    }
}

fn price_string(price: D256, decimal_places: i32, rounding: Rounding) -> String {
    num::render_plain(&num::round_to_places(price, decimal_places, rounding))
}
