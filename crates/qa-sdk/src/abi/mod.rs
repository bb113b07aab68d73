//! Solidity ABI encoding and decoding
//!
//! Covers the static and byte-string types that ERC20/ERC677 tokens and the
//! truffle `Migrations` contract use, plus parsing of artifact ABI JSON.
//!
//! # Example
//!
//! ```rust
//! use qa_sdk::abi::{encode_function_call, decode, function_selector, Token, ParamType};
//! use qa_sdk::{Address, U256};
//!
//! let selector = function_selector("transfer(address,uint256)");
//! let data = encode_function_call(selector, &[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))]);
//! assert_eq!(data.len(), 68);
//!
//! let return_data = [0u8; 32]; // From eth_call
//! let balance = decode(&[ParamType::Uint(256)], &return_data).unwrap();
//! assert_eq!(balance, vec![Token::Uint(U256::zero())]);
//! ```

mod decode;
mod encode;
mod json;
mod types;

pub use decode::decode;
pub use encode::{encode, encode_function_call, function_selector, parse_type};
pub use json::{AbiEntry, AbiParam};
pub use types::{ParamType, Token};
