//! ABI encoding

use qa_primitives::U256;

use super::types::{ParamType, Token};
use crate::SdkError;

/// Encode tokens according to Solidity ABI specification
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    // Every supported type occupies one 32-byte head slot
    let head_size = tokens.len() * 32;

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for token in tokens {
        if token.type_of().is_dynamic() {
            head.extend(encode_u256(&U256::from(head_size + tail.len())));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

/// Encode function call (selector + params)
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut result = selector.to_vec();
    result.extend(encode(tokens));
    result
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(addr) => {
            let mut buf = [0u8; 32];
            buf[12..32].copy_from_slice(addr.as_bytes());
            buf.to_vec()
        }
        Token::Uint(value) => encode_u256(value),
        Token::Bool(b) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            buf.to_vec()
        }
        Token::FixedBytes(data) => {
            let mut buf = [0u8; 32];
            let len = data.len().min(32);
            buf[..len].copy_from_slice(&data[..len]);
            buf.to_vec()
        }
        Token::Bytes(data) => encode_bytes(data),
        Token::String(s) => encode_bytes(s.as_bytes()),
    }
}

fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

/// Length word followed by the data right-padded to a 32-byte boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = qa_crypto::keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Parse a type string from an ABI definition (e.g. "uint256", "address")
pub fn parse_type(s: &str) -> Result<ParamType, SdkError> {
    let s = s.trim();

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        let bits: usize = if rest.is_empty() {
            256
        } else {
            rest.parse().map_err(|_| SdkError::AbiEncode(format!("Invalid uint size: {}", rest)))?
        };
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(SdkError::AbiEncode(format!("Invalid uint size: {}", bits)));
        }
        return Ok(ParamType::Uint(bits));
    }

    if let Some(rest) = s.strip_prefix("bytes") {
        let size: usize = rest
            .parse()
            .map_err(|_| SdkError::AbiEncode(format!("Invalid bytes size: {}", rest)))?;
        if size == 0 || size > 32 {
            return Err(SdkError::AbiEncode(format!("Invalid bytes size: {}", size)));
        }
        return Ok(ParamType::FixedBytes(size));
    }

    Err(SdkError::AbiEncode(format!("Unsupported type: {}", s)))
}
