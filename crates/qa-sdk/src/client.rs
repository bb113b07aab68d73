//! NodeClient - JSON-RPC client bound to one node

use std::time::Duration;

use qa_primitives::{parse_u256, Address, NetworkId, H256, U256};
use bytes::Bytes;
use serde_json::Value;

use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{BlockId, CallRequest, Receipt, TransactionRequest};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Seconds the node clock is pushed forward by [`NodeClient::advance_time_and_mine`]
pub const TIME_ADVANCE_SECS: u64 = 1;

/// Default number of blocks a receipt must have before a send is final
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Default delay between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Client for one node. Built once and passed by reference to everything
/// that talks to the chain.
pub struct NodeClient {
    transport: Box<dyn Transport>,
    confirmations: u64,
    poll_interval: Duration,
}

impl NodeClient {
    /// Create a client with HTTP transport.
    ///
    /// Issues `net_version` so an unreachable node fails here rather than
    /// halfway through a suite.
    #[cfg(feature = "http")]
    pub async fn connect(url: &str) -> Result<Self, SdkError> {
        let client = Self::with_transport(HttpTransport::new(url));
        let network = client.net_version().await?;
        tracing::info!(url, network, "connected to node");
        Ok(client)
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Confirmations a send needs before it resolves, counting the inclusion
    /// block as the first (minimum 1)
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Delay between receipt polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Configured confirmation depth
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    // ==================== Node Info ====================

    /// Node client identifier (`web3_clientVersion`), e.g. `RskJ/6.0.0/...`
    pub async fn client_version(&self) -> Result<String, SdkError> {
        self.request("web3_clientVersion", vec![]).await
    }

    /// Network id (`net_version`), the key used in artifact `networks`
    pub async fn net_version(&self) -> Result<NetworkId, SdkError> {
        let result: String = self.request("net_version", vec![]).await?;
        result
            .trim()
            .parse()
            .map_err(|_| SdkError::InvalidNumber(format!("net_version {:?}", result)))
    }

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<u64, SdkError> {
        let result: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, SdkError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    // ==================== Account Queries ====================

    /// Accounts the node holds keys for, funded at genesis on dev nodes
    pub async fn accounts(&self) -> Result<Vec<Address>, SdkError> {
        self.request("eth_accounts", vec![]).await
    }

    /// Native-coin balance in wei
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, SdkError> {
        let result: String = self
            .request(
                "eth_getBalance",
                vec![
                    Value::String(address.to_hex()),
                    serde_json::to_value(block)?,
                ],
            )
            .await?;
        Ok(parse_u256(&result)?)
    }

    /// Get the code at an address
    pub async fn get_code(&self, address: &Address, block: BlockId) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "eth_getCode",
                vec![
                    Value::String(address.to_hex()),
                    serde_json::to_value(block)?,
                ],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    // ==================== Calls & Transactions ====================

    /// Execute a call (read-only, does not create transaction)
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Submit a transaction for the node to sign; returns its hash as soon
    /// as the node accepts it
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<H256, SdkError> {
        let result: String = self
            .request("eth_sendTransaction", vec![serde_json::to_value(tx)?])
            .await?;
        let hash = H256::from_hex(&result)?;
        tracing::debug!(from = %tx.from, hash = %hash, "transaction accepted");
        Ok(hash)
    }

    /// Receipt for a mined transaction, `None` while pending
    pub async fn get_receipt(&self, hash: &H256) -> Result<Option<Receipt>, SdkError> {
        let value: Value = self
            .request("eth_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Receipt::from_json(value).map(Some)
    }

    /// Poll until the receipt exists and has the configured confirmations.
    ///
    /// Never gives up on its own; callers bound it with a timeout.
    pub async fn wait_for_receipt(&self, hash: &H256) -> Result<Receipt, SdkError> {
        loop {
            if let Some(receipt) = self.get_receipt(hash).await? {
                let head = self.block_number().await?;
                if head.saturating_add(1) >= receipt.block_number.saturating_add(self.confirmations) {
                    return Ok(receipt);
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Send, wait for confirmations, and fail on a reverted receipt
    pub async fn send_and_confirm(&self, tx: &TransactionRequest) -> Result<Receipt, SdkError> {
        let hash = self.send_transaction(tx).await?;
        let receipt = self.wait_for_receipt(&hash).await?;
        if !receipt.success {
            return Err(SdkError::Reverted(hash));
        }
        Ok(receipt)
    }

    /// Fee paid by a mined transaction: gas used times the price per gas.
    ///
    /// Uses `effectiveGasPrice` when the receipt carries it, otherwise the
    /// `gasPrice` of the transaction itself.
    pub async fn transaction_fee(&self, receipt: &Receipt) -> Result<U256, SdkError> {
        let price = match receipt.effective_gas_price {
            Some(price) => price,
            None => {
                let tx: Value = self
                    .request(
                        "eth_getTransactionByHash",
                        vec![Value::String(receipt.transaction_hash.to_hex())],
                    )
                    .await?;
                let price = tx
                    .get("gasPrice")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SdkError::MissingField("gasPrice".to_string()))?;
                parse_u256(price)?
            }
        };
        receipt.gas_used.checked_mul(price).ok_or_else(|| {
            SdkError::InvalidNumber(format!(
                "fee overflows uint256: gas used {} at price {}",
                receipt.gas_used, price
            ))
        })
    }

    // ==================== Time Control ====================

    /// Push the node clock forward (`evm_increaseTime`)
    pub async fn increase_time(&self, seconds: u64) -> Result<Value, SdkError> {
        self.transport
            .request_json("evm_increaseTime", vec![Value::from(seconds)])
            .await
    }

    /// Force the node to produce one block (`evm_mine`)
    pub async fn mine(&self) -> Result<Value, SdkError> {
        self.transport.request_json("evm_mine", vec![]).await
    }

    /// Advance the clock by [`TIME_ADVANCE_SECS`], then mine one block.
    ///
    /// The mine request is only issued after the time advance is
    /// acknowledged, otherwise the new block could carry the old timestamp.
    /// Resolves with the mining call's result.
    pub async fn advance_time_and_mine(&self) -> Result<Value, SdkError> {
        self.increase_time(TIME_ADVANCE_SECS).await?;
        let mined = self.mine().await?;
        tracing::debug!(result = %mined, "advanced time and mined a block");
        Ok(mined)
    }
}

// ==================== Helper Functions ====================

fn parse_hex_u64(s: &str) -> Result<u64, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(e.to_string()))
}

fn parse_hex_bytes(s: &str) -> Result<Bytes, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    let bytes = hex::decode(s)?;
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_mock_net_version() {
        let client = NodeClient::new_mock();
        assert_eq!(client.net_version().await.unwrap(), 33);
    }

    #[tokio::test]
    async fn test_client_mock_block_number() {
        let client = NodeClient::new_mock();
        let block_number = client.block_number().await.unwrap();
        assert_eq!(block_number, 256);
    }

    #[tokio::test]
    async fn test_client_version_contains_rskj() {
        let client = NodeClient::new_mock();
        assert!(client.client_version().await.unwrap().contains("RskJ"));
    }

    #[tokio::test]
    async fn test_advance_time_then_mine_in_order() {
        let transport = MockTransport::new();
        let client = NodeClient::with_transport(transport.clone());

        client.advance_time_and_mine().await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "evm_increaseTime");
        assert_eq!(calls[0].1, vec![Value::from(TIME_ADVANCE_SECS)]);
        assert_eq!(calls[1].0, "evm_mine");
    }

    #[tokio::test]
    async fn test_advance_time_failure_skips_mine() {
        let transport = MockTransport::new();
        transport.set_error("evm_increaseTime", -32601, "method not found");
        let client = NodeClient::with_transport(transport.clone());

        assert!(client.advance_time_and_mine().await.is_err());
        assert_eq!(transport.methods(), vec!["evm_increaseTime"]);
    }

    #[tokio::test]
    async fn test_advance_time_resolves_with_mine_result() {
        let transport = MockTransport::new();
        transport.set_response("evm_mine", Value::String("0x7".to_string()));
        let client = NodeClient::with_transport(transport);

        let result = client.advance_time_and_mine().await.unwrap();
        assert_eq!(result, Value::String("0x7".to_string()));
    }

    #[tokio::test]
    async fn test_confirmations_minimum_is_one() {
        let client = NodeClient::new_mock().with_confirmations(0);
        assert_eq!(client.confirmations(), 1);
    }

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x1").unwrap(), 1);
        assert_eq!(parse_hex_u64("0x100").unwrap(), 256);
        assert_eq!(parse_hex_u64("100").unwrap(), 256);
    }

    #[test]
    fn test_parse_hex_bytes_empty() {
        let result = parse_hex_bytes("0x").unwrap();
        assert!(result.is_empty());
    }
}
