//! Locally generated accounts

use qa_crypto::Keypair;
use qa_primitives::{Address, U256};

use crate::client::NodeClient;
use crate::types::BlockId;
use crate::SdkError;

/// Account whose key lives in this process, not on the node.
///
/// The node cannot sign for it; it is used as a fresh recipient whose
/// starting balance is known to be zero.
#[derive(Debug)]
pub struct LocalAccount {
    keypair: Keypair,
}

impl LocalAccount {
    /// Generate a new random account
    pub fn random() -> Self {
        let keypair = Keypair::random();
        tracing::debug!(address = %keypair.address(), "generated local account");
        Self { keypair }
    }

    /// Restore from a hex private key
    pub fn from_private_key(hex_key: &str) -> Result<Self, SdkError> {
        let keypair =
            Keypair::from_hex(hex_key).map_err(|e| SdkError::InvalidHex(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Private key as 0x-prefixed hex
    pub fn private_key_hex(&self) -> String {
        self.keypair.private_key_hex()
    }

    /// Native-coin balance at the latest block
    pub async fn balance(&self, client: &NodeClient) -> Result<U256, SdkError> {
        client.get_balance(&self.address(), BlockId::Latest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_accounts_differ() {
        let a = LocalAccount::random();
        let b = LocalAccount::random();
        assert_ne!(a.address(), b.address());
        assert!(!a.address().is_zero());
    }

    #[test]
    fn test_from_private_key() {
        let account = LocalAccount::from_private_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(
            account.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert!(LocalAccount::from_private_key("0x1234").is_err());
    }

    #[tokio::test]
    async fn test_fresh_balance_queries_latest() {
        let client = NodeClient::new_mock();
        let account = LocalAccount::random();
        assert_eq!(account.balance(&client).await.unwrap(), U256::zero());
    }
}
