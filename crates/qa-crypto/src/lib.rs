//! # qa-crypto
//!
//! Cryptographic helpers for the ERC677 QA suite.
//!
//! - Keccak-256 hashing (function selectors, address derivation)
//! - secp256k1 key generation for throwaway accounts
//! - Address derivation from public keys

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod key;
mod error;

pub use hash::keccak256;
pub use key::{public_key_to_address, Keypair, PrivateKey, PublicKey};
pub use error::CryptoError;
