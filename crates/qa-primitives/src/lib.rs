//! # qa-primitives
//!
//! Primitive types shared by the ERC677 QA crates.
//!
//! Token and coin amounts are always [`U256`]: balances on the dev node
//! routinely exceed what fits in a `u64`, and nothing here goes through
//! floating point.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;
mod error;

pub use address::{Address, AddressError};
pub use hash::{H256, HashError};
pub use error::PrimitiveError;

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Network identifier as reported by `net_version` and used as the key in
/// artifact `networks` maps
pub type NetworkId = u64;

/// Parse a decimal or `0x`-prefixed hex string into a [`U256`]
pub fn parse_u256(s: &str) -> Result<U256, PrimitiveError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some("") => Ok(U256::zero()),
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => U256::from_dec_str(s).map_err(|e| format!("{:?}", e)),
    };
    parsed.map_err(|reason| PrimitiveError::InvalidNumber {
        input: s.to_string(),
        reason,
    })
}

/// Format a [`U256`] as minimal `0x` hex, the quantity encoding used by JSON-RPC
pub fn to_quantity(value: &U256) -> String {
    format!("{:#x}", value)
}
