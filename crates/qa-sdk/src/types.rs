//! SDK types

use qa_primitives::{parse_u256, to_quantity, Address, H256, U256};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::SdkError;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
        }
    }
}

/// Call request for `eth_call`
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address
    pub to: Option<Address>,
    /// Input data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = [self.from.is_some(), self.to.is_some(), self.data.is_some()]
            .iter()
            .filter(|present| **present)
            .count();
        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Transaction for `eth_sendTransaction`, signed by the node with the
/// unlocked `from` account
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// Sender, must be an account the node can sign for
    pub from: Address,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Gas limit, node default when absent
    pub gas: Option<u64>,
    /// Gas price, node default when absent
    pub gas_price: Option<U256>,
    /// Value in wei
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
}

impl TransactionRequest {
    /// Plain value transfer
    pub fn transfer(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to: Some(to),
            gas: None,
            gas_price: None,
            value: Some(value),
            data: None,
        }
    }

    /// Contract call carrying calldata
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            gas: None,
            gas_price: None,
            value: None,
            data: Some(data),
        }
    }

    /// Contract creation with init code
    pub fn create(from: Address, init_code: Bytes) -> Self {
        Self {
            from,
            to: None,
            gas: None,
            gas_price: None,
            value: None,
            data: Some(init_code),
        }
    }

    /// Set the gas limit
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }
}

impl Serialize for TransactionRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("from", &self.from.to_hex())?;
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &to_quantity(gas_price))?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", &to_quantity(value))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }
        map.end()
    }
}

/// Mined transaction receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash
    pub transaction_hash: H256,
    /// Block the transaction was included in
    pub block_number: u64,
    /// Whether execution succeeded (`status == 0x1`)
    pub success: bool,
    /// Gas consumed
    pub gas_used: U256,
    /// Price per gas actually paid, when the node reports it
    pub effective_gas_price: Option<U256>,
    /// Address of the created contract, for deployments
    pub contract_address: Option<Address>,
}

/// Receipt fields as the node sends them
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: H256,
    block_number: String,
    #[serde(default)]
    status: Option<String>,
    gas_used: String,
    #[serde(default)]
    effective_gas_price: Option<String>,
    #[serde(default)]
    contract_address: Option<Address>,
}

impl TryFrom<RawReceipt> for Receipt {
    type Error = SdkError;

    fn try_from(raw: RawReceipt) -> Result<Self, Self::Error> {
        // RSK encodes a failed status as "0x" or "0x0", success as "0x1" or "0x01"
        let success = match raw.status.as_deref() {
            Some(status) => !parse_u256(status)?.is_zero(),
            None => true,
        };
        Ok(Receipt {
            transaction_hash: raw.transaction_hash,
            block_number: parse_u256(&raw.block_number)?.low_u64(),
            success,
            gas_used: parse_u256(&raw.gas_used)?,
            effective_gas_price: raw
                .effective_gas_price
                .as_deref()
                .map(parse_u256)
                .transpose()?,
            contract_address: raw.contract_address,
        })
    }
}

impl Receipt {
    /// Parse a receipt from its JSON-RPC representation
    pub fn from_json(value: serde_json::Value) -> Result<Self, SdkError> {
        let raw: RawReceipt = serde_json::from_value(value)?;
        Receipt::try_from(raw)
    }
}
