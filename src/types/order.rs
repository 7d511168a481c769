use serde::{Deserialize, Serialize};

use crate::num::Rounding;

/// Side of the order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Ask,
    Bid,
}

impl OrderSide {
    /// Rounding that never shows a price better for the user than the book
    /// can fill: bids round down, asks round up.
    pub fn conservative_rounding(&self) -> Rounding {
        match self {
            OrderSide::Bid => Rounding::Floor,
            OrderSide::Ask => Rounding::Ceil,
        }
    }

    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Ask => OrderSide::Bid,
            OrderSide::Bid => OrderSide::Ask,
        }
    }
}
