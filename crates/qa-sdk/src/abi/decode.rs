//! ABI decoding

use qa_primitives::{Address, U256};

use super::types::{ParamType, Token};
use crate::SdkError;

/// Decode tokens from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    types
        .iter()
        .enumerate()
        .map(|(i, param_type)| decode_token(param_type, data, i * 32))
        .collect()
}

fn decode_token(param_type: &ParamType, data: &[u8], offset: usize) -> Result<Token, SdkError> {
    let word = word_at(data, offset)?;
    match param_type {
        ParamType::Address => {
            let mut addr_bytes = [0u8; 20];
            addr_bytes.copy_from_slice(&word[12..32]);
            Ok(Token::Address(Address::from_bytes(addr_bytes)))
        }
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(word))),
        ParamType::Bool => Ok(Token::Bool(word[31] != 0)),
        ParamType::FixedBytes(size) => Ok(Token::FixedBytes(word[..*size].to_vec())),
        ParamType::Bytes => {
            let data_offset = to_usize(U256::from_big_endian(word))?;
            Ok(Token::Bytes(decode_bytes(data, data_offset)?))
        }
        ParamType::String => {
            let data_offset = to_usize(U256::from_big_endian(word))?;
            let bytes = decode_bytes(data, data_offset)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| SdkError::AbiDecode(format!("Invalid UTF-8: {}", e)))?;
            Ok(Token::String(s))
        }
    }
}

/// Dynamic bytes stored as a length word followed by the data
fn decode_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>, SdkError> {
    let len = to_usize(U256::from_big_endian(word_at(data, offset)?))?;
    let start = word_end(offset)?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| SdkError::AbiDecode("length overflow".to_string()))?;
    check_length(data, end)?;
    Ok(data[start..end].to_vec())
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], SdkError> {
    let end = word_end(offset)?;
    check_length(data, end)?;
    Ok(&data[offset..end])
}

fn word_end(offset: usize) -> Result<usize, SdkError> {
    offset
        .checked_add(32)
        .ok_or_else(|| SdkError::AbiDecode(format!("Offset out of range: {}", offset)))
}

fn to_usize(value: U256) -> Result<usize, SdkError> {
    if value > U256::from(usize::MAX) {
        return Err(SdkError::AbiDecode(format!("Offset out of range: {}", value)));
    }
    Ok(value.as_usize())
}

/// Check that data has at least `required` bytes
fn check_length(data: &[u8], required: usize) -> Result<(), SdkError> {
    if data.len() < required {
        return Err(SdkError::AbiDecode(format!(
            "Insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}
