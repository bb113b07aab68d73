//! Transport layer for RPC communication

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::SdkError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get JSON response
    async fn request_json(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, SdkError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

type Reply = Result<Value, (i64, String)>;

/// Mock transport for testing.
///
/// Answers from a table of canned responses per method. Queued one-shot
/// replies take precedence over fixed ones, and every request is recorded so
/// tests can assert on call order.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Reply>>>,
    queued: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    calls: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockTransport {
    /// Create a new mock transport with dev-node defaults
    pub fn new() -> Self {
        let mut defaults: HashMap<String, Reply> = HashMap::new();

        defaults.insert(
            "web3_clientVersion".to_string(),
            Ok(Value::String("RskJ/6.0.0/Linux/Java1.8/HOP-abcdef0".to_string())),
        );
        defaults.insert("net_version".to_string(), Ok(Value::String("33".to_string())));
        defaults.insert("eth_chainId".to_string(), Ok(Value::String("0x21".to_string())));
        defaults.insert("eth_blockNumber".to_string(), Ok(Value::String("0x100".to_string())));
        defaults.insert("eth_accounts".to_string(), Ok(Value::Array(vec![])));
        defaults.insert("eth_getBalance".to_string(), Ok(Value::String("0x0".to_string())));
        defaults.insert("eth_getCode".to_string(), Ok(Value::String("0x".to_string())));
        defaults.insert("eth_call".to_string(), Ok(Value::String("0x".to_string())));
        defaults.insert(
            "eth_sendTransaction".to_string(),
            Ok(Value::String(
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".to_string(),
            )),
        );
        defaults.insert("eth_getTransactionReceipt".to_string(), Ok(Value::Null));
        defaults.insert("evm_increaseTime".to_string(), Ok(Value::String("0x1".to_string())));
        defaults.insert("evm_mine".to_string(), Ok(Value::String("0x0".to_string())));

        Self {
            responses: Arc::new(Mutex::new(defaults)),
            queued: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a fixed response for a method
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_response(&self, method: &str, response: Value) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(method.to_string(), Ok(response));
    }

    /// Make a method fail with an RPC error
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(method.to_string(), Err((code, message.to_string())));
    }

    /// Queue a one-shot response, consumed before the fixed one
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn push_response(&self, method: &str, response: Value) {
        self.queued
            .lock()
            .expect("MockTransport mutex poisoned")
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Methods requested so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("MockTransport mutex poisoned")
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Requests so far with their params
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls
            .lock()
            .expect("MockTransport mutex poisoned")
            .clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, SdkError> {
        let poisoned = || SdkError::Transport("MockTransport mutex poisoned".to_string());

        self.calls
            .lock()
            .map_err(|_| poisoned())?
            .push((method.to_string(), params));

        let queued = self
            .queued
            .lock()
            .map_err(|_| poisoned())?
            .get_mut(method)
            .and_then(|q| q.pop_front());

        let reply = match queued {
            Some(reply) => Some(reply),
            None => self
                .responses
                .lock()
                .map_err(|_| poisoned())?
                .get(method)
                .cloned(),
        };

        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err((code, message))) => Err(SdkError::Rpc { code, message }),
            None => Err(SdkError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
            }),
        }
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, SdkError> {
        let id = self.next_id();
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(id, method, url = %self.url, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            tracing::debug!(id, method, code = error.code, "rpc error: {}", error.message);
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        // A null result is legitimate (e.g. receipt not yet available)
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_default_responses() {
        let transport = MockTransport::new();

        let result = transport
            .request_json("net_version", vec![])
            .await
            .unwrap();
        assert_eq!(result, Value::String("33".to_string()));
    }

    #[tokio::test]
    async fn test_mock_transport_custom_response() {
        let transport = MockTransport::new();
        transport.set_response("web3_clientVersion", Value::String("Geth/v1".to_string()));

        let result = transport
            .request_json("web3_clientVersion", vec![])
            .await
            .unwrap();
        assert_eq!(result, Value::String("Geth/v1".to_string()));
    }

    #[tokio::test]
    async fn test_mock_transport_queued_before_fixed() {
        let transport = MockTransport::new();
        transport.push_response("eth_blockNumber", Value::String("0x1".to_string()));

        let first = transport.request_json("eth_blockNumber", vec![]).await.unwrap();
        let second = transport.request_json("eth_blockNumber", vec![]).await.unwrap();
        assert_eq!(first, Value::String("0x1".to_string()));
        assert_eq!(second, Value::String("0x100".to_string()));
    }

    #[tokio::test]
    async fn test_mock_transport_error() {
        let transport = MockTransport::new();
        transport.set_error("evm_mine", -32000, "mining disabled");

        let err = transport.request_json("evm_mine", vec![]).await.unwrap_err();
        assert!(matches!(err, SdkError::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn test_mock_transport_records_calls() {
        let transport = MockTransport::new();
        transport.request_json("eth_accounts", vec![]).await.unwrap();
        let _ = transport.request_json("unknown_method", vec![Value::Bool(true)]).await;

        assert_eq!(transport.methods(), vec!["eth_accounts", "unknown_method"]);
        assert_eq!(transport.calls()[1].1, vec![Value::Bool(true)]);
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_method() {
        let transport = MockTransport::new();
        let result = transport
            .request_json("unknown_method", vec![])
            .await;
        assert!(matches!(result, Err(SdkError::Rpc { code: -32601, .. })));
    }
}
