/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Total bitcoin supply in satoshis. No valid output can exceed this, so
/// it bounds every amount accepted at the caller-facing boundary.
pub const MAX_MONEY_SAT: u64 = 21_000_000 * 100_000_000;

/// Convert a BTC amount to satoshis, rounding half away from zero to the
/// nearest integer. This is the precision boundary between caller-facing
/// BTC floats and the integer satoshi amounts everything downstream uses.
pub fn btc_to_sat(btc: f64) -> u64 {
    (btc * SATS_PER_BTC).round() as u64
}

/// Convert satoshis back to a BTC amount.
pub fn sat_to_btc(sat: u64) -> f64 {
    sat as f64 / SATS_PER_BTC
}
