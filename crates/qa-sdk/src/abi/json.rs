//! ABI JSON as found in compiled artifacts

use serde::Deserialize;

use super::encode::parse_type;
use super::types::ParamType;
use crate::SdkError;

/// One parameter of an ABI entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AbiParam {
    /// Parameter name, may be empty
    #[serde(default)]
    pub name: String,
    /// Solidity type string
    #[serde(rename = "type")]
    pub kind: String,
}

/// One entry of an ABI array.
///
/// Events, fallback and receive entries are parsed but carry no callable
/// surface.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AbiEntry {
    /// `function`, `constructor`, `event`, `fallback` or `receive`
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Function or event name
    #[serde(default)]
    pub name: String,
    /// Inputs
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Outputs
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

// Solidity omits "type" for plain functions in some older compilers
fn default_kind() -> String {
    "function".to_string()
}

impl AbiEntry {
    /// Parse a whole ABI array
    pub fn parse_all(abi: &serde_json::Value) -> Result<Vec<AbiEntry>, SdkError> {
        serde_json::from_value(abi.clone()).map_err(|e| SdkError::AbiDecode(format!("ABI JSON: {}", e)))
    }

    /// Whether this entry is a callable function
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// Whether this entry is the constructor
    pub fn is_constructor(&self) -> bool {
        self.kind == "constructor"
    }

    /// Input types
    pub fn input_types(&self) -> Result<Vec<ParamType>, SdkError> {
        self.inputs.iter().map(|p| parse_type(&p.kind)).collect()
    }

    /// Output types
    pub fn output_types(&self) -> Result<Vec<ParamType>, SdkError> {
        self.outputs.iter().map(|p| parse_type(&p.kind)).collect()
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> Result<String, SdkError> {
        let inputs = self
            .input_types()?
            .iter()
            .map(ParamType::canonical)
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{}({})", self.name, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_entries() {
        let abi = json!([
            {
                "constant": false,
                "inputs": [
                    {"name": "_to", "type": "address"},
                    {"name": "_value", "type": "uint"}
                ],
                "name": "transfer",
                "outputs": [{"name": "", "type": "bool"}],
                "payable": false,
                "stateMutability": "nonpayable",
                "type": "function"
            },
            {
                "inputs": [{"name": "initialAccount", "type": "address"}],
                "payable": false,
                "stateMutability": "nonpayable",
                "type": "constructor"
            },
            {
                "anonymous": false,
                "inputs": [{"indexed": true, "name": "from", "type": "address"}],
                "name": "Transfer",
                "type": "event"
            }
        ]);

        let entries = AbiEntry::parse_all(&abi).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_function());
        assert_eq!(entries[0].signature().unwrap(), "transfer(address,uint256)");
        assert!(entries[1].is_constructor());
        assert_eq!(entries[1].input_types().unwrap(), vec![ParamType::Address]);
        assert!(!entries[2].is_function());
    }

    #[test]
    fn test_parse_not_an_array() {
        assert!(AbiEntry::parse_all(&json!({"type": "function"})).is_err());
    }
}
