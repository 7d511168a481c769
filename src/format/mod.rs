//! Display formatting for amounts and prices.
//!
//! Every function here sits on the render path: invalid or non-finite
//! input renders as a zero-equivalent string instead of failing.

mod decimal;
mod units;

pub use decimal::*;
pub use units::*;
