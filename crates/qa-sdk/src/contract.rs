//! Contract handles: an ABI plus a deployed address

use qa_primitives::{Address, H256, U256};
use bytes::Bytes;

use crate::abi::{decode, encode, encode_function_call, function_selector, AbiEntry, ParamType, Token};
use crate::client::NodeClient;
use crate::types::{BlockId, CallRequest, Receipt, TransactionRequest};
use crate::SdkError;

/// Contract helper for encoding/decoding function calls
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Function definitions
    functions: Vec<FunctionDef>,
    /// Constructor input types, when the ABI declares one
    constructor: Option<Vec<ParamType>>,
    /// Gas limit for sends, node default when unset
    gas_limit: Option<u64>,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Function selector (4 bytes)
    pub selector: [u8; 4],
    /// Input parameter types
    pub inputs: Vec<ParamType>,
    /// Output parameter types
    pub outputs: Vec<ParamType>,
}

impl FunctionDef {
    /// Create a function definition; the signature is derived from the inputs
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        let name = name.into();
        let args = inputs.iter().map(ParamType::canonical).collect::<Vec<_>>().join(",");
        let signature = format!("{}({})", name, args);
        let selector = function_selector(&signature);
        Self {
            name,
            signature,
            selector,
            inputs,
            outputs,
        }
    }
}

impl Contract {
    /// Create a contract handle with no functions
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
            constructor: None,
            gas_limit: None,
        }
    }

    /// Build from a parsed ABI.
    ///
    /// Functions using types this codec does not support are left out; the
    /// handle can still call everything else.
    pub fn from_abi(address: Address, abi: &[AbiEntry]) -> Result<Self, SdkError> {
        let mut contract = Self::new(address);
        for entry in abi {
            if entry.is_constructor() {
                contract.constructor = Some(entry.input_types()?);
            } else if entry.is_function() {
                match (entry.input_types(), entry.output_types()) {
                    (Ok(inputs), Ok(outputs)) => {
                        contract.add_function(FunctionDef::new(entry.name.clone(), inputs, outputs))
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::debug!(function = %entry.name, "skipping ABI entry: {}", e)
                    }
                }
            }
        }
        Ok(contract)
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Point the handle at another deployment of the same ABI
    pub fn at(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Set the gas limit used for sends
    pub fn with_gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }

    /// Add a function definition
    pub fn add_function(&mut self, function: FunctionDef) {
        self.functions.push(function);
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Encode a function call, checking arity and argument types
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, SdkError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| SdkError::AbiEncode(format!("Unknown function: {}", function_name)))?;

        check_args(&function.signature, &function.inputs, args)?;
        Ok(Bytes::from(encode_function_call(function.selector, args)))
    }

    /// Decode function output
    pub fn decode_output(&self, function_name: &str, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| SdkError::AbiDecode(format!("Unknown function: {}", function_name)))?;

        decode(&function.outputs, data)
    }

    /// Init code for a deployment: bytecode followed by encoded constructor args
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Token]) -> Result<Bytes, SdkError> {
        let inputs = self.constructor.clone().unwrap_or_default();
        check_args("constructor", &inputs, args)?;
        let mut data = bytecode.to_vec();
        data.extend(encode(args));
        Ok(Bytes::from(data))
    }

    /// Read-only call at the latest block
    pub async fn call(
        &self,
        client: &NodeClient,
        function_name: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, SdkError> {
        let data = self.encode_call(function_name, args)?;
        let request = CallRequest {
            to: Some(self.address),
            data: Some(data),
            ..Default::default()
        };
        let output = client.call(&request, BlockId::Latest).await?;
        self.decode_output(function_name, &output)
    }

    /// State-changing call signed by the node for `from`.
    ///
    /// Resolves once the transaction is confirmed; a reverted receipt is an
    /// error.
    pub async fn send(
        &self,
        client: &NodeClient,
        from: Address,
        function_name: &str,
        args: &[Token],
    ) -> Result<Receipt, SdkError> {
        let data = self.encode_call(function_name, args)?;
        let mut tx = TransactionRequest::call(from, self.address, data);
        tx.gas = self.gas_limit;
        client.send_and_confirm(&tx).await
    }
}

fn check_args(what: &str, inputs: &[ParamType], args: &[Token]) -> Result<(), SdkError> {
    if args.len() != inputs.len() {
        return Err(SdkError::AbiEncode(format!(
            "{}: expected {} arguments, got {}",
            what,
            inputs.len(),
            args.len()
        )));
    }
    if let Some((i, (expected, _))) = inputs
        .iter()
        .zip(args)
        .enumerate()
        .find(|(_, (param, token))| !param.accepts(token))
    {
        return Err(SdkError::AbiEncode(format!(
            "{}: argument {} is not a {}",
            what,
            i,
            expected.canonical()
        )));
    }
    Ok(())
}

/// Builder for creating common contract interfaces
pub struct ContractBuilder {
    contract: Contract,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            contract: Contract::new(address),
        }
    }

    /// Add a function
    pub fn function(mut self, name: &str, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        self.contract.add_function(FunctionDef::new(name, inputs, outputs));
        self
    }

    /// Declare constructor inputs
    pub fn constructor(mut self, inputs: Vec<ParamType>) -> Self {
        self.contract.constructor = Some(inputs);
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        self.contract
    }
}

/// ERC677 interface: ERC20 plus `transferAndCall`
pub fn erc677(address: Address) -> Contract {
    ContractBuilder::new(address)
        .constructor(vec![
            ParamType::Address,
            ParamType::Uint(256),
            ParamType::String,
            ParamType::String,
        ])
        .function("name", vec![], vec![ParamType::String])
        .function("symbol", vec![], vec![ParamType::String])
        .function("decimals", vec![], vec![ParamType::Uint(8)])
        .function("totalSupply", vec![], vec![ParamType::Uint(256)])
        .function("balanceOf", vec![ParamType::Address], vec![ParamType::Uint(256)])
        .function(
            "transfer",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .function(
            "transferAndCall",
            vec![ParamType::Address, ParamType::Uint(256), ParamType::Bytes],
            vec![ParamType::Bool],
        )
        .function(
            "allowance",
            vec![ParamType::Address, ParamType::Address],
            vec![ParamType::Uint(256)],
        )
        .build()
}

/// Truffle `Migrations` bookkeeping contract
pub fn migrations(address: Address) -> Contract {
    ContractBuilder::new(address)
        .constructor(vec![])
        .function("owner", vec![], vec![ParamType::Address])
        .function("last_completed_migration", vec![], vec![ParamType::Uint(256)])
        .function("setCompleted", vec![ParamType::Uint(256)], vec![])
        .build()
}

/// Typed ERC677 token handle
#[derive(Debug, Clone)]
pub struct Erc677 {
    contract: Contract,
}

impl Erc677 {
    /// Wrap a generic handle, checking the token functions are present
    pub fn new(contract: Contract) -> Result<Self, SdkError> {
        for name in ["totalSupply", "balanceOf", "transfer"] {
            if contract.function(name).is_none() {
                return Err(SdkError::AbiDecode(format!("ABI lacks {}", name)));
            }
        }
        Ok(Self { contract })
    }

    /// Handle with the built-in ERC677 ABI
    pub fn at(address: Address) -> Self {
        Self {
            contract: erc677(address),
        }
    }

    /// Deployed address
    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// Underlying generic handle
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    async fn call_uint(&self, client: &NodeClient, name: &str, args: &[Token]) -> Result<U256, SdkError> {
        self.contract
            .call(client, name, args)
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| SdkError::AbiDecode(format!("{} did not return a uint", name)))
    }

    async fn call_string(&self, client: &NodeClient, name: &str) -> Result<String, SdkError> {
        self.contract
            .call(client, name, &[])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| SdkError::AbiDecode(format!("{} did not return a string", name)))
    }

    /// `totalSupply()`
    pub async fn total_supply(&self, client: &NodeClient) -> Result<U256, SdkError> {
        self.call_uint(client, "totalSupply", &[]).await
    }

    /// `balanceOf(owner)`
    pub async fn balance_of(&self, client: &NodeClient, owner: &Address) -> Result<U256, SdkError> {
        self.call_uint(client, "balanceOf", &[Token::Address(*owner)]).await
    }

    /// `name()`
    pub async fn name(&self, client: &NodeClient) -> Result<String, SdkError> {
        self.call_string(client, "name").await
    }

    /// `symbol()`
    pub async fn symbol(&self, client: &NodeClient) -> Result<String, SdkError> {
        self.call_string(client, "symbol").await
    }

    /// `decimals()`
    pub async fn decimals(&self, client: &NodeClient) -> Result<u8, SdkError> {
        let value = self.call_uint(client, "decimals", &[]).await?;
        u8::try_from(value.low_u32())
            .ok()
            .filter(|_| value <= U256::from(u8::MAX))
            .ok_or_else(|| SdkError::AbiDecode(format!("decimals out of range: {}", value)))
    }

    /// `transfer(to, amount)` from `from`; resolves with the transaction hash
    pub async fn transfer(
        &self,
        client: &NodeClient,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<H256, SdkError> {
        let receipt = self
            .contract
            .send(client, from, "transfer", &[Token::Address(to), Token::Uint(amount)])
            .await?;
        Ok(receipt.transaction_hash)
    }

    /// ERC677 `transferAndCall(to, amount, data)`
    pub async fn transfer_and_call(
        &self,
        client: &NodeClient,
        from: Address,
        to: Address,
        amount: U256,
        data: Vec<u8>,
    ) -> Result<H256, SdkError> {
        let receipt = self
            .contract
            .send(
                client,
                from,
                "transferAndCall",
                &[Token::Address(to), Token::Uint(amount), Token::Bytes(data)],
            )
            .await?;
        Ok(receipt.transaction_hash)
    }
}
