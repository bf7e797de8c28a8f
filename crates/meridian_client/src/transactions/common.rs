use async_trait::async_trait;
use derive_more::Debug;
use meridian_transact::{Address, EMPTY_SIGNATURE, SignedTransaction, Transaction};
use std::sync::Arc;

/// Signs transactions on behalf of their senders. The engine never inspects
/// key material; it only hands unsigned transactions to this trait.
#[async_trait]
pub trait TxnSigner: Send + Sync {
    async fn sign_txns(
        &self,
        txns: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String>;

    async fn sign_txn(&self, txn: &Transaction) -> Result<SignedTransaction, String> {
        let result = self.sign_txns(&[txn.clone()], &[0]).await?;
        Ok(result[0].clone())
    }
}

/// Resolves the signer responsible for a sender address.
#[async_trait]
pub trait TxnSignerGetter: Send + Sync {
    async fn get_signer(&self, address: Address) -> Option<Arc<dyn TxnSigner>>;
}

/// A signer that attaches an all-zero signature. Only useful for flows that
/// allow empty signatures, such as simulation.
pub struct EmptySigner {}

#[async_trait]
impl TxnSigner for EmptySigner {
    async fn sign_txns(
        &self,
        txns: &[Transaction],
        indices: &[usize],
    ) -> Result<Vec<SignedTransaction>, String> {
        indices
            .iter()
            .map(|&idx| {
                if idx < txns.len() {
                    Ok(SignedTransaction {
                        transaction: txns[idx].clone(),
                        signature: Some(EMPTY_SIGNATURE),
                    })
                } else {
                    Err(format!("Index {} out of bounds for transactions", idx))
                }
            })
            .collect()
    }
}

#[async_trait]
impl TxnSignerGetter for EmptySigner {
    async fn get_signer(&self, _address: Address) -> Option<Arc<dyn TxnSigner>> {
        Some(Arc::new(EmptySigner {}))
    }
}

/// Parameters shared by every composer atom.
#[derive(Debug, Default, Clone)]
pub struct CommonParams {
    /// The sender identity for this atom.
    pub sender: Address,
    /// Signer override for this atom; falls back to the engine's signer getter.
    #[debug(skip)]
    pub signer: Option<Arc<dyn TxnSigner>>,
    /// Optional note bytes.
    pub note: Option<Vec<u8>>,
    /// Fee override; when unset the minimum fee is assigned.
    pub static_fee: Option<u64>,
    /// Upper bound on the assigned fee.
    pub max_fee: Option<u64>,
}
