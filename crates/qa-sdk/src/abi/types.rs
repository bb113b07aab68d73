//! ABI type definitions

use qa_primitives::{Address, U256};

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
}

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::Bytes | ParamType::String)
    }

    /// Canonical name as used in function signatures
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Uint(bits) => format!("uint{}", bits),
            ParamType::Bool => "bool".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes(size) => format!("bytes{}", size),
            ParamType::String => "string".to_string(),
        }
    }

    /// Whether a token can be encoded as this type
    pub fn accepts(&self, token: &Token) -> bool {
        matches!(
            (self, token),
            (ParamType::Address, Token::Address(_))
                | (ParamType::Uint(_), Token::Uint(_))
                | (ParamType::Bool, Token::Bool(_))
                | (ParamType::Bytes, Token::Bytes(_))
                | (ParamType::FixedBytes(_), Token::FixedBytes(_))
                | (ParamType::String, Token::String(_))
        )
    }
}

impl Token {
    /// Get the type of this token
    pub fn type_of(&self) -> ParamType {
        match self {
            Token::Address(_) => ParamType::Address,
            Token::Uint(_) => ParamType::Uint(256),
            Token::Bool(_) => ParamType::Bool,
            Token::Bytes(_) => ParamType::Bytes,
            Token::FixedBytes(b) => ParamType::FixedBytes(b.len()),
            Token::String(_) => ParamType::String,
        }
    }

    /// The integer value, if this is a `Uint`
    pub fn into_uint(self) -> Option<U256> {
        match self {
            Token::Uint(value) => Some(value),
            _ => None,
        }
    }

    /// The string value, if this is a `String`
    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is a `Bool`
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(b),
            _ => None,
        }
    }
}
