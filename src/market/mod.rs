//! Order book snapshots as delivered by the trading SDK, and their
//! reduction to display rows.
//!
//! The tick to price lookup is external to this crate and reached through
//! the [`PriceBook`] trait; [`CloberTicks`] implements it with the on-chain
//! tick math.

mod depth;
mod tick;


pub use depth::{
    DEFAULT_TICK_RATIO, DecimalPlaces, DepthLevel, MAX_DECIMAL_CANDIDATES, decimal_place_candidates,
    format_price_string, get_price_decimals, parse_depth,
};
pub use tick::{CloberTicks, MAX_TICK, MIN_TICK};

use fastnum::D256;
use serde::{Deserialize, Serialize};

use crate::{
    error::PriceError,
    num,
    types::{Currency, OrderSide},
};

/// Order book snapshot of one market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub base: Currency,
    pub quote: Currency,
    /// Bid levels, in whatever order the SDK returned them.
    #[serde(default)]
    pub bids: Vec<Depth>,
    /// Ask levels, in whatever order the SDK returned them.
    #[serde(default)]
    pub asks: Vec<Depth>,
}

impl Market {
    pub fn depth(&self, side: OrderSide) -> &[Depth] {
        match side {
            OrderSide::Bid => &self.bids,
            OrderSide::Ask => &self.asks,
        }
    }

    /// Highest bid price, ignoring unparsable levels.
    pub fn best_bid(&self) -> Option<D256> {
        self.bids.iter().filter_map(Depth::parsed_price).max()
    }

    /// Lowest ask price, ignoring unparsable levels.
    pub fn best_ask(&self) -> Option<D256> {
        self.asks.iter().filter_map(Depth::parsed_price).min()
    }

    /// Tighter of the two top-of-book prices, used to pick depth resolutions.
    pub fn min_price(&self) -> Option<D256> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(bid.min(ask)),
            (bid, ask) => bid.or(ask),
        }
    }
}

/// One raw order book level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depth {
    pub price: String,
    pub tick: i32,
    pub base_amount: String,
}

impl Depth {
    pub fn new(price: impl Into<String>, tick: i32, base_amount: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            tick,
            base_amount: base_amount.into(),
        }
    }

    fn parsed_price(&self) -> Option<D256> {
        num::parse_decimal(&self.price).filter(|p| !p.is_zero())
    }
}

/// Achievable ticks around a requested price.
#[derive(Clone, Copy, derive_more::Debug, PartialEq)]
pub struct PriceNeighborhood {
    /// Tick that does not cross the requested price: at or below it for
    /// bids, at or above it for asks.
    pub tick: i32,
    #[debug("{price}")]
    pub price: D256,
    /// Next achievable price above `price`.
    #[debug("{up}")]
    pub up: D256,
    /// Next achievable price below `price`.
    #[debug("{down}")]
    pub down: D256,
}

/// Tick to price lookup of an order book.
pub trait PriceBook {
    /// Human-readable price of `tick` on `side`.
    fn tick_price(&self, tick: i32, side: OrderSide) -> Result<D256, PriceError>;

    /// Achievable ticks around `price` on `side`.
    fn price_neighborhood(&self, price: D256, side: OrderSide) -> Result<PriceNeighborhood, PriceError>;
}

impl<T: PriceBook + ?Sized> PriceBook for &T {
    fn tick_price(&self, tick: i32, side: OrderSide) -> Result<D256, PriceError> {
        (**self).tick_price(tick, side)
    }

    fn price_neighborhood(&self, price: D256, side: OrderSide) -> Result<PriceNeighborhood, PriceError> {
        (**self).price_neighborhood(price, side)
    }
}
