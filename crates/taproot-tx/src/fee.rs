use bitcoin::secp256k1::Keypair;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaprootError;
use crate::transaction::Skeleton;

/// Fee floor in satoshis: covers the minimum viable single-input,
/// single-output key-path spend even when the economy rate rounds the
/// product below relay-viable levels.
pub const MIN_FEE_SAT: u64 = 154;

/// Network fee-rate tiers in sats/vbyte, fetched per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTiers {
    pub fastest: u64,
    pub half_hour: u64,
    pub hour: u64,
    pub economy: u64,
    pub minimum: u64,
}

/// Estimate the fee for the spend the skeleton describes.
///
/// Signs and finalizes a throwaway clone of the skeleton purely to measure
/// its virtual size, then charges `vsize * economy`, floored at
/// [`MIN_FEE_SAT`]. The clone is discarded, never broadcast.
pub fn estimate_fee(
    skeleton: &Skeleton,
    tweaked: &Keypair,
    tiers: &FeeTiers,
) -> Result<u64, TaprootError> {
    let probe = skeleton.clone().sign_and_finalize(tweaked)?;
    let vsize = probe.vsize() as u64;

    let fee = vsize.saturating_mul(tiers.economy).max(MIN_FEE_SAT);
    debug!(vsize, rate = tiers.economy, fee, "estimated fee");

    Ok(fee)
}
