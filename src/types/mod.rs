mod balance;
mod currency;
mod order;

pub use balance::{Balances, Prices};
pub use currency::Currency;
pub use order::OrderSide;

/// Unix timestamp in milliseconds.
pub type TimestampMs = u64;
