//! secp256k1 keys and address derivation

use k256::ecdsa::{SigningKey, VerifyingKey};
use qa_primitives::Address;
use rand::rngs::OsRng;

use crate::{keccak256, CryptoError};

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

/// A secp256k1 key pair with its derived address.
///
/// Debug output never includes the private key.
pub struct Keypair {
    private_key: PrivateKey,
    address: Address,
}

impl Keypair {
    /// Generate a fresh key from the OS random source
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Build from a hex private key (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    fn from_signing_key(private_key: SigningKey) -> Self {
        let address = public_key_to_address(private_key.verifying_key());
        Self {
            private_key,
            address,
        }
    }

    /// Derived account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }

    /// Raw private key bytes, hex encoded with 0x prefix
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.private_key.to_bytes()))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address.to_hex())
            .finish_non_exhaustive()
    }
}

/// Derive an address: last 20 bytes of keccak256 over the uncompressed
/// public key without its 0x04 prefix
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key_address() {
        // Well-known dev key
        let kp = Keypair::from_hex(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(
            kp.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_random_keys_differ() {
        let a = Keypair::random();
        let b = Keypair::random();
        assert_ne!(a.address(), b.address());
        assert!(!a.address().is_zero());
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let kp = Keypair::random();
        let again = Keypair::from_hex(&kp.private_key_hex()).unwrap();
        assert_eq!(kp.address(), again.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(Keypair::from_hex("0x00").is_err());
        assert!(Keypair::from_hex(&"00".repeat(32)).is_err());
        assert!(Keypair::from_hex("not hex").is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let kp = Keypair::random();
        let debug = format!("{:?}", kp);
        assert!(debug.contains(&kp.address().to_hex()));
        assert!(!debug.contains(&kp.private_key_hex()[2..]));
    }
}
