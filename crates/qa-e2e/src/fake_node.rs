//! In-memory stand-in for an RSK regtest node
//!
//! Speaks the JSON-RPC subset the suite uses and keeps a native-coin ledger
//! plus at most one ERC677 token ledger. Every accepted transaction is mined
//! into its own block immediately.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use qa_crypto::keccak256;
use qa_primitives::{parse_u256, to_quantity, Address, H256, U256};
use qa_sdk::abi::{self, function_selector, ParamType, Token};
use qa_sdk::{Artifact, NetworkEntry, SdkError, Transport};
use serde_json::{json, Value};

use crate::E2EResult;

/// Dev accounts of an RSK regtest node, in `eth_accounts` order
pub const RSK_REGTEST_ACCOUNTS: [&str; 10] = [
    "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826",
    "0x7986b3df570230288501eea3d890bd66948c9b79",
    "0x0a3aa774752ec2042c46548456c094a76c7f3a79",
    "0xcf7cdbbb5f7ba79d3ffe74a0bba13fc0295f6036",
    "0x39b12c05e8503356e3a7df0b7b33efa4c054c409",
    "0xc354d97642faa06781b76ffb6786f72cd7746c97",
    "0xdebe71e1de41fc77c44df4b6db940026e31b0e71",
    "0x7857288e171c6159c5576d1bd9ac40c0c48a771c",
    "0xa4dea4d5c954f5fd9e87f0e9752911e83a3d18b3",
    "0x09a1eda29f664ac8f68106f6567276df0c65d859",
];

/// Regtest genesis balance of each dev account, in wei
pub const GENESIS_BALANCE: u128 = 999_999_999_999_999_999_999_999_999_000;

const CLIENT_VERSION: &str = "RskJ/6.1.0/Linux/Java1.8/ARROWHEAD-fake";
const TX_GAS: u64 = 21_000;
const TOKEN_OP_GAS: u64 = 30_000;
const CREATE_GAS: u64 = 32_000;

/// Creation code the fake node recognises as the ERC677 token
pub const TOKEN_BYTECODE: &str = "0x60806040526012600255";
const TOKEN_CODE: [u8; 10] = [0x60, 0x80, 0x60, 0x40, 0x52, 0x60, 0x12, 0x60, 0x02, 0x55];

/// Creation code for the bookkeeping contract
pub const MIGRATIONS_BYTECODE: &str = "0x608060405234801561001057600080fd5b50";

struct TokenLedger {
    address: Address,
    name: String,
    symbol: String,
    total_supply: U256,
    balances: HashMap<Address, U256>,
}

impl TokenLedger {
    fn balance(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    /// Move tokens; false when the sender is short (the contract reverts)
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let available = self.balance(&from);
        if available < amount {
            return false;
        }
        self.balances.insert(from, available - amount);
        let credited = self.balance(&to).saturating_add(amount);
        self.balances.insert(to, credited);
        true
    }
}

struct NodeState {
    client_version: String,
    network_id: u64,
    accounts: Vec<Address>,
    native: HashMap<Address, U256>,
    code: HashMap<Address, Vec<u8>>,
    token: Option<TokenLedger>,
    gas_price: U256,
    block_number: u64,
    time_offset: u64,
    tx_count: u64,
    receipts: HashMap<H256, Value>,
    transactions: HashMap<H256, Value>,
    failures: HashMap<String, (i64, String)>,
    stalled: HashSet<String>,
    log: Vec<String>,
}

/// Fake node; clones share one ledger
#[derive(Clone)]
pub struct FakeNode {
    state: Arc<Mutex<NodeState>>,
}

impl FakeNode {
    /// Regtest accounts with genesis balances and no contracts
    pub fn new() -> Self {
        let accounts: Vec<Address> = RSK_REGTEST_ACCOUNTS
            .iter()
            .filter_map(|a| Address::from_hex(a).ok())
            .collect();
        let native = accounts
            .iter()
            .map(|a| (*a, U256::from(GENESIS_BALANCE)))
            .collect();

        Self {
            state: Arc::new(Mutex::new(NodeState {
                client_version: CLIENT_VERSION.to_string(),
                network_id: 33,
                accounts,
                native,
                code: HashMap::new(),
                token: None,
                gas_price: U256::zero(),
                block_number: 0,
                time_offset: 0,
                tx_count: 0,
                receipts: HashMap::new(),
                transactions: HashMap::new(),
                failures: HashMap::new(),
                stalled: HashSet::new(),
                log: Vec::new(),
            })),
        }
    }

    /// Node with the QA token already deployed: 100,000,000 units owned by
    /// the first account
    pub fn with_token() -> Self {
        let node = Self::new();
        {
            let mut state = node.state.lock();
            let owner = state.accounts[0];
            let address = Address::from_bytes([
                0x0e, 0x19, 0x67, 0x4e, 0xbc, 0x2f, 0x2b, 0x6d, 0xf3, 0xe7, 0xc0, 0x1b, 0x2a,
                0xa6, 0xd5, 0x8a, 0x2c, 0x3a, 0x11, 0x6e,
            ]);
            state.install_token(address, owner, U256::from(100_000_000u64), "QAToken", "QAT");
        }
        node
    }

    /// Keep only the first `count` accounts (at most 10)
    pub fn with_account_count(self, count: usize) -> Self {
        {
            let mut state = self.state.lock();
            let dropped: Vec<Address> = state.accounts.iter().skip(count).copied().collect();
            state.accounts.truncate(count);
            for account in dropped {
                state.native.remove(&account);
            }
        }
        self
    }

    /// Charge fees at this price per gas
    pub fn with_gas_price(self, price: U256) -> Self {
        self.state.lock().gas_price = price;
        self
    }

    /// Report a different `web3_clientVersion`
    pub fn with_client_version(self, version: &str) -> Self {
        self.state.lock().client_version = version.to_string();
        self
    }

    /// Address of the token ledger, if one is deployed
    pub fn token_address(&self) -> Option<Address> {
        self.state.lock().token.as_ref().map(|t| t.address)
    }

    /// Node accounts
    pub fn accounts(&self) -> Vec<Address> {
        self.state.lock().accounts.clone()
    }

    /// Current block height
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    /// Seconds the clock was pushed forward by `evm_increaseTime`
    pub fn time_offset(&self) -> u64 {
        self.state.lock().time_offset
    }

    /// Overwrite a token balance without touching the supply
    pub fn set_token_balance(&self, owner: Address, amount: U256) {
        if let Some(token) = self.state.lock().token.as_mut() {
            token.balances.insert(owner, amount);
        }
    }

    /// Overwrite a native balance
    pub fn set_native_balance(&self, owner: Address, amount: U256) {
        self.state.lock().native.insert(owner, amount);
    }

    /// Make every request for `method` fail with an RPC error
    pub fn fail(&self, method: &str, code: i64, message: &str) {
        self.state
            .lock()
            .failures
            .insert(method.to_string(), (code, message.to_string()));
    }

    /// Make every request for `method` hang forever
    pub fn stall(&self, method: &str) {
        self.state.lock().stalled.insert(method.to_string());
    }

    /// Methods requested so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }

    /// Token artifact with this node's deployment recorded under network 33
    pub fn token_artifact(&self) -> E2EResult<Artifact> {
        let mut artifact = artifact_from(erc677_artifact_json())?;
        if let Some(address) = self.token_address() {
            artifact.set_deployment(33, NetworkEntry::new(address, H256::ZERO));
        }
        Ok(artifact)
    }
}

impl Default for FakeNode {
    fn default() -> Self {
        Self::new()
    }
}

fn artifact_from(json: Value) -> E2EResult<Artifact> {
    Ok(Artifact::from_json(&json.to_string())?)
}

fn abi_fn(name: &str, inputs: &[(&str, &str)], outputs: &[&str]) -> Value {
    json!({
        "type": "function",
        "name": name,
        "inputs": inputs.iter().map(|(n, t)| json!({"name": n, "type": t})).collect::<Vec<_>>(),
        "outputs": outputs.iter().map(|t| json!({"name": "", "type": t})).collect::<Vec<_>>(),
    })
}

/// Truffle-style artifact for the token the fake node implements
pub fn erc677_artifact_json() -> Value {
    json!({
        "contractName": "ERC677",
        "abi": [
            {"type": "constructor", "inputs": [
                {"name": "_owner", "type": "address"},
                {"name": "_totalSupply", "type": "uint256"},
                {"name": "_name", "type": "string"},
                {"name": "_symbol", "type": "string"}
            ]},
            abi_fn("name", &[], &["string"]),
            abi_fn("symbol", &[], &["string"]),
            abi_fn("decimals", &[], &["uint8"]),
            abi_fn("totalSupply", &[], &["uint256"]),
            abi_fn("balanceOf", &[("_owner", "address")], &["uint256"]),
            abi_fn("transfer", &[("_to", "address"), ("_value", "uint256")], &["bool"]),
            abi_fn(
                "transferAndCall",
                &[("_to", "address"), ("_value", "uint256"), ("_data", "bytes")],
                &["bool"],
            ),
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false},
                {"name": "data", "type": "bytes", "indexed": false}
            ]}
        ],
        "bytecode": TOKEN_BYTECODE,
        "networks": {},
        "compiler": {"name": "solc", "version": "0.4.24+commit.e67f0147.Emscripten.clang"},
        "schemaVersion": "3.0.1"
    })
}

/// Truffle-style artifact for the bookkeeping contract
pub fn migrations_artifact_json() -> Value {
    json!({
        "contractName": "Migrations",
        "abi": [
            {"type": "constructor", "inputs": []},
            abi_fn("owner", &[], &["address"]),
            abi_fn("last_completed_migration", &[], &["uint256"]),
            abi_fn("setCompleted", &[("completed", "uint256")], &[]),
            abi_fn("upgrade", &[("new_address", "address")], &[])
        ],
        "bytecode": MIGRATIONS_BYTECODE,
        "networks": {},
        "schemaVersion": "3.0.1"
    })
}

impl NodeState {
    fn install_token(&mut self, address: Address, owner: Address, supply: U256, name: &str, symbol: &str) {
        let mut balances = HashMap::new();
        balances.insert(owner, supply);
        self.code.insert(address, TOKEN_CODE.to_vec());
        self.token = Some(TokenLedger {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply: supply,
            balances,
        });
    }

    fn dispatch(&mut self, method: &str, params: &[Value]) -> Result<Value, SdkError> {
        match method {
            "web3_clientVersion" => Ok(json!(self.client_version)),
            "net_version" => Ok(json!(self.network_id.to_string())),
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.network_id))),
            "eth_accounts" => Ok(json!(self
                .accounts
                .iter()
                .map(Address::to_hex)
                .collect::<Vec<_>>())),
            "eth_blockNumber" => Ok(json!(format!("0x{:x}", self.block_number))),
            "eth_getBalance" => {
                let owner = address_param(params, 0)?;
                Ok(json!(to_quantity(&self.native.get(&owner).copied().unwrap_or_default())))
            }
            "eth_getCode" => {
                let address = address_param(params, 0)?;
                let code = self.code.get(&address).map(hex::encode).unwrap_or_default();
                Ok(json!(format!("0x{}", code)))
            }
            "eth_call" => self.call(params),
            "eth_sendTransaction" => self.send(params),
            "eth_getTransactionReceipt" => {
                let hash = hash_param(params)?;
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            "eth_getTransactionByHash" => {
                let hash = hash_param(params)?;
                Ok(self.transactions.get(&hash).cloned().unwrap_or(Value::Null))
            }
            "evm_increaseTime" => {
                let seconds = params.first().and_then(Value::as_u64).ok_or_else(|| invalid("seconds"))?;
                self.time_offset += seconds;
                Ok(json!(format!("0x{:x}", self.time_offset)))
            }
            "evm_mine" => {
                self.block_number += 1;
                Ok(Value::Null)
            }
            other => Err(SdkError::Rpc {
                code: -32601,
                message: format!("the method {} does not exist/is not available", other),
            }),
        }
    }

    fn call(&self, params: &[Value]) -> Result<Value, SdkError> {
        let request = params.first().ok_or_else(|| invalid("call object"))?;
        let to = field_address(request, "to")?.ok_or_else(|| invalid("to"))?;
        let data = field_bytes(request, "data")?;

        let output = match self.token.as_ref().filter(|t| t.address == to) {
            Some(token) if data.len() >= 4 => token_view(token, &data)?,
            _ => Vec::new(),
        };
        Ok(json!(format!("0x{}", hex::encode(output))))
    }

    fn send(&mut self, params: &[Value]) -> Result<Value, SdkError> {
        let tx = params.first().ok_or_else(|| invalid("transaction object"))?;
        let from = field_address(tx, "from")?.ok_or_else(|| invalid("from"))?;
        let to = field_address(tx, "to")?;
        let data = field_bytes(tx, "data")?;
        let value = match tx.get("value").and_then(Value::as_str) {
            Some(v) => parse_u256(v)?,
            None => U256::zero(),
        };
        let gas_price = match tx.get("gasPrice").and_then(Value::as_str) {
            Some(p) => parse_u256(p)?,
            None => self.gas_price,
        };

        if !self.accounts.contains(&from) {
            return Err(SdkError::Rpc {
                code: -32000,
                message: format!("could not unlock account {}", from),
            });
        }

        let gas_used = TX_GAS
            + data.len() as u64 * 16
            + match to {
                None => CREATE_GAS,
                Some(_) if !data.is_empty() => TOKEN_OP_GAS,
                Some(_) => 0,
            };
        let balance = self.native.get(&from).copied().unwrap_or_default();
        let cost = U256::from(gas_used)
            .checked_mul(gas_price)
            .and_then(|fee| fee.checked_add(value).map(|total| (fee, total)));
        let fee = match cost {
            Some((fee, total)) if total <= balance => fee,
            _ => {
                return Err(SdkError::Rpc {
                    code: -32010,
                    message: "insufficient funds for gas * price + value".to_string(),
                })
            }
        };

        self.tx_count += 1;
        let mut preimage = from.as_bytes().to_vec();
        preimage.extend_from_slice(&self.tx_count.to_be_bytes());
        preimage.extend_from_slice(&data);
        let hash = keccak256(&preimage);

        self.native.insert(from, balance - value - fee);
        let mut contract_address = None;
        let success = match to {
            Some(to) => {
                let credited = self.native.get(&to).copied().unwrap_or_default().saturating_add(value);
                self.native.insert(to, credited);
                self.execute(from, to, &data)?
            }
            None => {
                let address = created_address(&from, self.tx_count);
                self.create(from, address, &data)?;
                contract_address = Some(address);
                true
            }
        };

        self.block_number += 1;
        self.receipts.insert(
            hash,
            json!({
                "transactionHash": hash.to_hex(),
                "transactionIndex": "0x0",
                "blockNumber": format!("0x{:x}", self.block_number),
                "from": from.to_hex(),
                "to": to.map(|a| a.to_hex()),
                "status": if success { "0x01" } else { "0x" },
                "gasUsed": format!("0x{:x}", gas_used),
                "cumulativeGasUsed": format!("0x{:x}", gas_used),
                "contractAddress": contract_address.map(|a| a.to_hex()),
                "logs": [],
            }),
        );
        self.transactions.insert(
            hash,
            json!({
                "hash": hash.to_hex(),
                "from": from.to_hex(),
                "to": to.map(|a| a.to_hex()),
                "value": to_quantity(&value),
                "gasPrice": to_quantity(&gas_price),
                "blockNumber": format!("0x{:x}", self.block_number),
            }),
        );
        tracing::debug!(hash = %hash, block = self.block_number, success, "fake node mined transaction");
        Ok(json!(hash.to_hex()))
    }

    /// Run a call against a contract; returns whether it succeeded
    fn execute(&mut self, from: Address, to: Address, data: &[u8]) -> Result<bool, SdkError> {
        let token = match self.token.as_mut().filter(|t| t.address == to) {
            Some(token) => token,
            // plain value transfer or a contract without modelled behaviour
            None => return Ok(true),
        };
        if data.len() < 4 {
            return Ok(false);
        }
        let (selector, args) = data.split_at(4);
        if selector == function_selector("transfer(address,uint256)") {
            let (recipient, amount) = transfer_args(args, &[ParamType::Address, ParamType::Uint(256)])?;
            Ok(token.transfer(from, recipient, amount))
        } else if selector == function_selector("transferAndCall(address,uint256,bytes)") {
            let (recipient, amount) = transfer_args(
                args,
                &[ParamType::Address, ParamType::Uint(256), ParamType::Bytes],
            )?;
            Ok(token.transfer(from, recipient, amount))
        } else {
            Ok(false)
        }
    }

    fn create(&mut self, from: Address, address: Address, init: &[u8]) -> Result<(), SdkError> {
        if init.starts_with(&TOKEN_CODE) {
            let args = abi::decode(
                &[ParamType::Address, ParamType::Uint(256), ParamType::String, ParamType::String],
                &init[TOKEN_CODE.len()..],
            )?;
            let mut args = args.into_iter();
            let owner = args.next().and_then(|t| match t {
                Token::Address(a) => Some(a),
                _ => None,
            });
            let supply = args.next().and_then(Token::into_uint);
            let name = args.next().and_then(Token::into_string);
            let symbol = args.next().and_then(Token::into_string);
            match (owner, supply, name, symbol) {
                (Some(owner), Some(supply), Some(name), Some(symbol)) => {
                    self.install_token(address, owner, supply, &name, &symbol)
                }
                _ => return Err(invalid("token constructor arguments")),
            }
        } else {
            self.code.insert(address, init.to_vec());
        }
        tracing::debug!(%from, %address, "fake node created contract");
        Ok(())
    }
}

fn token_view(token: &TokenLedger, data: &[u8]) -> Result<Vec<u8>, SdkError> {
    let (selector, args) = data.split_at(4);
    let result = if selector == function_selector("totalSupply()") {
        Token::Uint(token.total_supply)
    } else if selector == function_selector("balanceOf(address)") {
        match abi::decode(&[ParamType::Address], args)?.pop() {
            Some(Token::Address(owner)) => Token::Uint(token.balance(&owner)),
            _ => return Err(invalid("balanceOf argument")),
        }
    } else if selector == function_selector("name()") {
        Token::String(token.name.clone())
    } else if selector == function_selector("symbol()") {
        Token::String(token.symbol.clone())
    } else if selector == function_selector("decimals()") {
        Token::Uint(U256::from(18))
    } else {
        return Ok(Vec::new());
    };
    Ok(abi::encode(&[result]))
}

fn transfer_args(args: &[u8], types: &[ParamType]) -> Result<(Address, U256), SdkError> {
    let mut tokens = abi::decode(types, args)?.into_iter();
    match (tokens.next(), tokens.next()) {
        (Some(Token::Address(to)), Some(Token::Uint(amount))) => Ok((to, amount)),
        _ => Err(invalid("transfer arguments")),
    }
}

fn created_address(from: &Address, nonce: u64) -> Address {
    let mut preimage = from.as_bytes().to_vec();
    preimage.extend_from_slice(&nonce.to_be_bytes());
    let hash = keccak256(&preimage);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

fn invalid(what: &str) -> SdkError {
    SdkError::Rpc {
        code: -32602,
        message: format!("invalid params: {}", what),
    }
}

fn address_param(params: &[Value], index: usize) -> Result<Address, SdkError> {
    let s = params.get(index).and_then(Value::as_str).ok_or_else(|| invalid("address"))?;
    Ok(Address::from_hex(s)?)
}

fn hash_param(params: &[Value]) -> Result<H256, SdkError> {
    let s = params.first().and_then(Value::as_str).ok_or_else(|| invalid("hash"))?;
    Ok(H256::from_hex(s)?)
}

fn field_address(object: &Value, field: &str) -> Result<Option<Address>, SdkError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(Address::from_hex)
        .transpose()
        .map_err(SdkError::from)
}

fn field_bytes(object: &Value, field: &str) -> Result<Vec<u8>, SdkError> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) => Ok(hex::decode(s.trim_start_matches("0x"))?),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl Transport for FakeNode {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let stalled = {
            let mut state = self.state.lock();
            state.log.push(method.to_string());
            if let Some((code, message)) = state.failures.get(method).cloned() {
                return Err(SdkError::Rpc { code, message });
            }
            state.stalled.contains(method)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        self.state.lock().dispatch(method, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_sdk::{Erc677, NodeClient};

    #[test]
    fn test_regtest_accounts_parse() {
        let node = FakeNode::new();
        assert_eq!(node.accounts().len(), RSK_REGTEST_ACCOUNTS.len());
        assert_eq!(
            node.accounts()[0],
            Address::from_hex("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826").unwrap()
        );
    }

    #[test]
    fn test_genesis_balance_matches_decimal() {
        assert_eq!(
            U256::from(GENESIS_BALANCE),
            U256::from_dec_str("999999999999999999999999999000").unwrap()
        );
    }

    #[tokio::test]
    async fn test_token_transfer_moves_balance() {
        let node = FakeNode::with_token();
        let token = Erc677::at(node.token_address().unwrap());
        let accounts = node.accounts();
        let client = NodeClient::with_transport(node.clone());

        token
            .transfer(&client, accounts[0], accounts[1], U256::from(1000))
            .await
            .unwrap();

        assert_eq!(
            token.balance_of(&client, &accounts[1]).await.unwrap(),
            U256::from(1000)
        );
        assert_eq!(
            token.balance_of(&client, &accounts[0]).await.unwrap(),
            U256::from(99_999_000u64)
        );
        assert_eq!(node.block_number(), 1);
    }

    #[tokio::test]
    async fn test_token_transfer_and_call_moves_balance() {
        let node = FakeNode::with_token();
        let token = Erc677::at(node.token_address().unwrap());
        let accounts = node.accounts();
        let client = NodeClient::with_transport(node.clone());

        let hash = token
            .transfer_and_call(&client, accounts[0], accounts[2], U256::from(250), b"hi".to_vec())
            .await
            .unwrap();

        let receipt = client.get_receipt(&hash).await.unwrap().unwrap();
        assert_eq!(receipt.transaction_hash, hash);
        assert!(receipt.success);
        assert_eq!(
            token.balance_of(&client, &accounts[2]).await.unwrap(),
            U256::from(250)
        );
        assert_eq!(
            token.balance_of(&client, &accounts[0]).await.unwrap(),
            U256::from(99_999_750u64)
        );
    }

    #[tokio::test]
    async fn test_token_transfer_over_balance_reverts() {
        let node = FakeNode::with_token();
        let token = Erc677::at(node.token_address().unwrap());
        let accounts = node.accounts();
        let client = NodeClient::with_transport(node);

        let err = token
            .transfer(&client, accounts[1], accounts[2], U256::from(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Reverted(_)));
        assert!(token.balance_of(&client, &accounts[2]).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_token_metadata() {
        let node = FakeNode::with_token();
        let token = Erc677::at(node.token_address().unwrap());
        let client = NodeClient::with_transport(node);

        assert_eq!(token.name(&client).await.unwrap(), "QAToken");
        assert_eq!(token.symbol(&client).await.unwrap(), "QAT");
        assert_eq!(token.decimals(&client).await.unwrap(), 18);
        assert_eq!(
            token.total_supply(&client).await.unwrap(),
            U256::from(100_000_000u64)
        );
    }

    #[tokio::test]
    async fn test_unknown_sender_rejected() {
        let node = FakeNode::new();
        let client = NodeClient::with_transport(node);
        let tx = qa_sdk::types::TransactionRequest::transfer(
            Address::from_bytes([9; 20]),
            Address::ZERO,
            U256::one(),
        );
        assert!(matches!(
            client.send_transaction(&tx).await,
            Err(SdkError::Rpc { code: -32000, .. })
        ));
    }

    #[tokio::test]
    async fn test_evm_methods() {
        let node = FakeNode::new();
        let client = NodeClient::with_transport(node.clone());

        client.advance_time_and_mine().await.unwrap();
        assert_eq!(node.time_offset(), 1);
        assert_eq!(node.block_number(), 1);
        assert_eq!(node.methods(), vec!["evm_increaseTime", "evm_mine"]);
    }

    #[tokio::test]
    async fn test_fee_charged_at_gas_price() {
        let node = FakeNode::new().with_gas_price(U256::from(10));
        let accounts = node.accounts();
        let client = NodeClient::with_transport(node);

        let receipt = client
            .send_and_confirm(&qa_sdk::types::TransactionRequest::transfer(
                accounts[5],
                accounts[6],
                U256::from(1000),
            ))
            .await
            .unwrap();
        let fee = client.transaction_fee(&receipt).await.unwrap();
        assert_eq!(fee, U256::from(TX_GAS * 10));

        let balance = client
            .get_balance(&accounts[5], Default::default())
            .await
            .unwrap();
        assert_eq!(balance, U256::from(GENESIS_BALANCE) - 1000u64 - fee);
    }

    #[tokio::test]
    async fn test_fee_overflow_rejected() {
        let node = FakeNode::new().with_gas_price(U256::MAX);
        let accounts = node.accounts();
        let client = NodeClient::with_transport(node);

        let result = client
            .send_transaction(&qa_sdk::types::TransactionRequest::transfer(
                accounts[5],
                accounts[6],
                U256::from(1),
            ))
            .await;
        assert!(matches!(result, Err(SdkError::Rpc { code: -32010, .. })));
    }
}
