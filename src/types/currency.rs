use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// ERC-20 (or native) token as described by the trading SDK.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Currency {
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Native currency is represented by the zero address.
    pub fn is_native(&self) -> bool {
        self.address == Address::ZERO
    }
}
