use fastnum::{D256, dec256};

use super::{Market, PriceBook, PriceNeighborhood};
use crate::{error::PriceError, num, types::OrderSide};

/// Largest tick the on-chain book accepts.
pub const MAX_TICK: i32 = 524287;
/// Smallest tick the on-chain book accepts.
pub const MIN_TICK: i32 = -MAX_TICK;

/// Price ratio between two adjacent ticks.
const TICK_BASE: D256 = dec256!(1.0001);

/// Tick math of the Clober v2 order book.
///
/// A bid at `tick` quotes `1.0001^tick` raw quote units per raw base unit,
/// an ask at `tick` quotes `1.0001^-tick`. Human-readable prices scale
/// that by `10^(base_decimals - quote_decimals)`.
///
/// Internally both sides are walked on one ladder whose index grows with
/// the price, so the ask index is the negated tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloberTicks {
    base_decimals: u8,
    quote_decimals: u8,
}

impl CloberTicks {
    pub fn new(base_decimals: u8, quote_decimals: u8) -> Self {
        Self {
            base_decimals,
            quote_decimals,
        }
    }

    pub fn for_market(market: &Market) -> Self {
        Self::new(market.base.decimals, market.quote.decimals)
    }

    fn scale(&self) -> D256 {
        num::pow10(self.base_decimals as i32 - self.quote_decimals as i32)
    }

    fn ladder_price(&self, index: i32) -> D256 {
        let mut exp = index.unsigned_abs();
        let mut base = TICK_BASE;
        let mut result = dec256!(1);
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exp >>= 1;
        }
        if index < 0 {
            result = dec256!(1) / result;
        }
        result * self.scale()
    }

    fn ladder_index(tick: i32, side: OrderSide) -> i32 {
        match side {
            OrderSide::Bid => tick,
            OrderSide::Ask => -tick,
        }
    }

    /// Ladder index of the achievable price nearest to `price` that does not
    /// cross it on `side`.
    fn conservative_index(&self, price: D256, side: OrderSide) -> Result<i32, PriceError> {
        let out_of_range = || PriceError::PriceOutOfRange(num::render_plain(&price));

        let ratio = num::to_f64(&(price / self.scale()));
        let estimate = (ratio.ln() / num::to_f64(&TICK_BASE).ln()).floor();
        if !estimate.is_finite()
            || estimate < (MIN_TICK - 1) as f64
            || estimate > (MAX_TICK + 1) as f64
        {
            return Err(out_of_range());
        }
        let mut index = (estimate as i32).clamp(MIN_TICK, MAX_TICK);

        // The float estimate can be off by a tick either way.
        match side {
            OrderSide::Bid => {
                while index < MAX_TICK && self.ladder_price(index + 1) <= price {
                    index += 1;
                }
                while self.ladder_price(index) > price {
                    if index == MIN_TICK {
                        return Err(out_of_range());
                    }
                    index -= 1;
                }
            }
            OrderSide::Ask => {
                while index > MIN_TICK && self.ladder_price(index - 1) >= price {
                    index -= 1;
                }
                while self.ladder_price(index) < price {
                    if index == MAX_TICK {
                        return Err(out_of_range());
                    }
                    index += 1;
                }
            }
        }
        Ok(index)
    }
}

impl PriceBook for CloberTicks {
    fn tick_price(&self, tick: i32, side: OrderSide) -> Result<D256, PriceError> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PriceError::TickOutOfRange(tick));
        }
        Ok(self.ladder_price(Self::ladder_index(tick, side)))
    }

    fn price_neighborhood(&self, price: D256, side: OrderSide) -> Result<PriceNeighborhood, PriceError> {
        if !price.is_finite() || price.is_zero() || price.is_negative() {
            return Err(PriceError::NonPositivePrice(num::render_plain(&price)));
        }
        let index = self.conservative_index(price, side)?;
        Ok(PriceNeighborhood {
            tick: Self::ladder_index(index, side),
            price: self.ladder_price(index),
            up: self.ladder_price(index + 1),
            down: self.ladder_price(index - 1),
        })
    }
}
