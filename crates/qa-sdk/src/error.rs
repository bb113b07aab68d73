//! SDK error types

use qa_primitives::{NetworkId, H256};
use thiserror::Error;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid numeric quantity
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// ABI encoding error
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// ABI decoding error
    #[error("ABI decoding error: {0}")]
    AbiDecode(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Malformed or unreadable artifact file
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Artifact has no deployment recorded for the network
    #[error("{contract} has no deployment on network {network_id}")]
    MissingDeployment {
        /// Contract name from the artifact
        contract: String,
        /// Network that was looked up
        network_id: NetworkId,
    },

    /// Transaction was mined with status 0
    #[error("Transaction {0} reverted")]
    Reverted(H256),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<qa_primitives::PrimitiveError> for SdkError {
    fn from(e: qa_primitives::PrimitiveError) -> Self {
        match e {
            qa_primitives::PrimitiveError::InvalidNumber { .. } => {
                SdkError::InvalidNumber(e.to_string())
            }
            other => SdkError::InvalidAddress(other.to_string()),
        }
    }
}

impl From<qa_primitives::AddressError> for SdkError {
    fn from(e: qa_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<qa_primitives::HashError> for SdkError {
    fn from(e: qa_primitives::HashError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}
