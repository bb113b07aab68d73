//! # qa-sdk
//!
//! Client-side plumbing for exercising a token contract on an RSK node.
//!
//! ## Features
//!
//! - **NodeClient**: JSON-RPC client with confirmation waits and dev-node
//!   time control (`evm_increaseTime`, `evm_mine`)
//! - **Contract / Erc677**: ABI-driven call encoding and typed token handle
//! - **Artifact**: truffle build output, read and written back
//! - **LocalAccount**: throwaway secp256k1 accounts
//! - **ABI**: Solidity ABI encoding and decoding for static and basic dynamic types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qa_sdk::{Artifact, Erc677, NodeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NodeClient::connect("http://localhost:4444").await?;
//!     let network = client.net_version().await?;
//!
//!     let artifact = Artifact::load("build/contracts/ERC677.json")?;
//!     let token = Erc677::new(artifact.contract_at(network)?)?;
//!
//!     let accounts = client.accounts().await?;
//!     let balance = token.balance_of(&client, &accounts[0]).await?;
//!     println!("owner holds {}", balance);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod account;
pub mod artifact;
mod client;
pub mod contract;
mod error;
mod transport;
pub mod types;

pub use account::LocalAccount;
pub use artifact::{artifact_path, Artifact, NetworkEntry};
pub use client::{NodeClient, DEFAULT_CONFIRMATIONS, DEFAULT_POLL_INTERVAL, TIME_ADVANCE_SECS};
pub use contract::{Contract, Erc677};
pub use error::SdkError;
pub use transport::MockTransport;

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use qa_primitives::{parse_u256, to_quantity, Address, NetworkId, H256, U256};
pub use types::Receipt;
