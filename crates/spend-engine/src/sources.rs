use async_trait::async_trait;
use thiserror::Error;

use taproot_tx::fee::FeeTiers;
use taproot_tx::utxo::Utxo;

/// A collaborator call failed. Implementations put whatever transport
/// detail they have in the message; the engine surfaces it as
/// `NetworkUnavailable`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// Network source of unspent outputs for an address.
#[async_trait]
pub trait UtxoSource: Send + Sync {
    async fn utxos_for_address(&self, address: &str) -> Result<Vec<Utxo>, SourceError>;
}

/// Network source of current fee-rate tiers.
#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn fee_tiers(&self) -> Result<FeeTiers, SourceError>;
}

/// Hands a finalized raw transaction to the network. Returns the txid on
/// acceptance, errors on rejection. The engine never retries a broadcast.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, SourceError>;
}

/// Store of encrypted custodial keys, owned by an external collaborator.
/// Returns the at-rest envelope for a wallet, or `None` for an unknown id.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn encrypted_key(&self, wallet_id: &str) -> Result<Option<String>, SourceError>;
}
