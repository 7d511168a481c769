//! Per-currency price and balance lookups with explicit zero defaults.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

/// USD prices keyed by currency address.
///
/// Unknown currencies are priced at zero.
#[derive(Clone, Debug, Default)]
pub struct Prices {
    inner: HashMap<Address, f64>,
}

impl Prices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price of `currency`, or zero when unknown or not a finite number.
    pub fn get(&self, currency: &Address) -> f64 {
        self.inner
            .get(currency)
            .copied()
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
    }

    pub fn insert(&mut self, currency: Address, price: f64) {
        self.inner.insert(currency, price);
    }

    pub fn contains(&self, currency: &Address) -> bool {
        self.inner.contains_key(currency)
    }
}

impl FromIterator<(Address, f64)> for Prices {
    fn from_iter<T: IntoIterator<Item = (Address, f64)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Wallet balances keyed by currency address.
///
/// Unknown currencies hold a zero balance.
#[derive(Clone, Debug, Default)]
pub struct Balances {
    inner: HashMap<Address, U256>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, currency: &Address) -> U256 {
        self.inner.get(currency).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, currency: Address, balance: U256) {
        self.inner.insert(currency, balance);
    }
}

impl FromIterator<(Address, U256)> for Balances {
    fn from_iter<T: IntoIterator<Item = (Address, U256)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
