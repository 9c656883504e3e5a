use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TaprootError;

/// Flat pre-fee buffer added to the target when accumulating inputs, so the
/// selection usually survives the fee computed afterwards without another
/// round trip. The exact shortfall check happens once the fee is known.
pub const FLAT_RESERVE_SAT: u64 = 1_000;

/// A single unspent transaction output, as reported by the network
/// UTXO source. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID as a hex string (display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in satoshis.
    pub value_sat: u64,
    /// Whether the containing transaction is confirmed.
    pub confirmed: bool,
    /// Confirmation height, if confirmed.
    pub block_height: Option<u32>,
}

impl Utxo {
    /// The (txid, vout) pair identifying this output.
    pub fn outpoint(&self) -> (String, u32) {
        (self.txid.clone(), self.vout)
    }
}

/// Result of UTXO selection: the chosen inputs and their aggregate value.
#[derive(Debug, Clone)]
pub struct Selection {
    pub inputs: Vec<Utxo>,
    pub total_sat: u64,
}

/// Accumulate confirmed UTXOs until they cover `target_sat` plus the flat
/// reserve, stopping as soon as the threshold is met.
///
/// Unconfirmed UTXOs are never spent. If the address has no confirmed
/// UTXOs at all this fails with `InsufficientFunds`; if the confirmed set
/// exists but falls short, the partial selection is returned and the
/// builder raises the precise shortfall once the fee is known.
pub fn select_utxos(utxos: &[Utxo], target_sat: u64) -> Result<Selection, TaprootError> {
    let unconfirmed = utxos.iter().filter(|u| !u.confirmed).count();
    if unconfirmed > 0 {
        warn!(count = unconfirmed, "skipping unconfirmed UTXOs");
    }

    // Saturating: an extreme target must surface as insufficient funds,
    // not wrap the threshold around.
    let threshold = target_sat.saturating_add(FLAT_RESERVE_SAT);

    let confirmed: Vec<&Utxo> = utxos.iter().filter(|u| u.confirmed).collect();
    if confirmed.is_empty() {
        return Err(TaprootError::InsufficientFunds {
            needed_sat: threshold,
            available_sat: 0,
        });
    }
    let mut inputs = Vec::new();
    let mut total_sat: u64 = 0;

    for utxo in confirmed {
        inputs.push(utxo.clone());
        total_sat += utxo.value_sat;
        if total_sat >= threshold {
            break;
        }
    }

    debug!(
        inputs = inputs.len(),
        total_sat, threshold, "selected funding inputs"
    );

    Ok(Selection { inputs, total_sat })
}
