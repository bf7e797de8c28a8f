use crate::transactions::{TxnSigner, TxnSignerGetter};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use meridian_transact::{Address, CanonicalMsgpack, KeyPairAccount, SignedTransaction, Transaction};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::sync::Arc;

/// A funded test account holding an ed25519 keypair.
///
/// Implements both the signer and signer-getter traits so a fixture can hand
/// it straight to the engine.
#[derive(Debug, Clone)]
pub struct SigningAccount {
    signing_key: SigningKey,
}

impl SigningAccount {
    /// Generates a new random account.
    pub fn generate() -> Self {
        SigningAccount {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Derives an account from an explicit seed, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut key_bytes = [0u8; 32];
        rng.fill_bytes(&mut key_bytes);
        SigningAccount {
            signing_key: SigningKey::from_bytes(&key_bytes),
        }
    }

    /// The account's address, derived from its public key.
    pub fn address(&self) -> Address {
        let pub_key = self.signing_key.verifying_key().to_bytes();
        KeyPairAccount::from_pubkey(&pub_key).address()
    }
}

#[async_trait]
impl TxnSigner for SigningAccount {
    async fn sign_txns(
        &self,
        txns: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String> {
        indices
            .iter()
            .map(|&idx| {
                let txn = txns
                    .get(idx)
                    .ok_or_else(|| format!("Index {} out of bounds for transactions", idx))?;
                let message = txn
                    .encode()
                    .map_err(|e| format!("Failed to encode transaction: {}", e))?;
                let signature = self.signing_key.sign(&message);
                Ok(SignedTransaction {
                    transaction: txn.clone(),
                    signature: Some(signature.to_bytes()),
                })
            })
            .collect()
    }
}

#[async_trait]
impl TxnSignerGetter for SigningAccount {
    async fn get_signer(&self, address: Address) -> Option<Arc<dyn TxnSigner>> {
        if address == self.address() {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_accounts_are_reproducible() {
        let one = SigningAccount::from_seed(7);
        let two = SigningAccount::from_seed(7);
        assert_eq!(one.address(), two.address());

        let other = SigningAccount::from_seed(8);
        assert_ne!(one.address(), other.address());
    }

    #[tokio::test]
    async fn test_signature_verifies() {
        use ed25519_dalek::{Signature, Verifier, VerifyingKey};
        use meridian_transact::test_utils::TransactionMother;

        let account = SigningAccount::from_seed(7);
        let mut txn = TransactionMother::simple_payment();
        txn.header_mut().sender = account.address();

        let signed = account.sign_txn(&txn).await.unwrap();
        let message = txn.encode().unwrap();
        let key = VerifyingKey::from_bytes(account.address().as_bytes()).unwrap();
        let signature = Signature::from_bytes(&signed.signature.unwrap());
        assert!(key.verify(&message, &signature).is_ok());
    }
}
