use std::sync::Arc;

use bitcoin::Address;
use tracing::{debug, info};

use custody::CipherConfig;
use taproot_tx::address::parse_address;
use taproot_tx::amount::{btc_to_sat, MAX_MONEY_SAT};
use taproot_tx::fee::estimate_fee;
use taproot_tx::keys::{derive_identity, tweak_keypair, KeyMaterial};
use taproot_tx::transaction::{to_hex, Skeleton};
use taproot_tx::utxo::select_utxos;
use taproot_tx::Network;

use crate::error::SpendError;
use crate::reservation::ReservationTable;
use crate::sources::{Broadcaster, FeeSource, KeyStore, UtxoSource};
use crate::types::{Receiver, SpendOutcome};

/// Builds, funds, signs and broadcasts single-key-path Taproot spends.
///
/// Holds the network collaborators, the immutable cipher configuration for
/// custodial keys, and the per-address reservation table. Everything else
/// is per-request; a failed request has no external side effects, and a
/// request aborted before broadcast leaves no reservation behind.
pub struct SpendEngine {
    network: Network,
    cipher: CipherConfig,
    utxos: Arc<dyn UtxoSource>,
    fees: Arc<dyn FeeSource>,
    broadcaster: Arc<dyn Broadcaster>,
    keys: Arc<dyn KeyStore>,
    reservations: Arc<ReservationTable>,
}

impl SpendEngine {
    pub fn new(
        network: Network,
        cipher: CipherConfig,
        utxos: Arc<dyn UtxoSource>,
        fees: Arc<dyn FeeSource>,
        broadcaster: Arc<dyn Broadcaster>,
        keys: Arc<dyn KeyStore>,
    ) -> Self {
        Self {
            network,
            cipher,
            utxos,
            fees,
            broadcaster,
            keys,
            reservations: ReservationTable::new(),
        }
    }

    /// Wallet creation: generate a fresh key pair, derive its funding
    /// address, and seal the private key for at-rest storage. The caller
    /// persists the returned `(address, envelope)` pair; the plaintext key
    /// never leaves this function.
    pub fn generate_wallet_key(&self) -> Result<(String, String), SpendError> {
        let material = KeyMaterial::generate();
        let identity = derive_identity(&material.public_key(), self.network);
        let envelope = custody::encrypt(&self.cipher, &material.secret_hex())?;
        Ok((identity.address.to_string(), envelope))
    }

    /// Spend from a custodial wallet: fetch the stored envelope, decrypt
    /// it, and build from the recovered key. The plaintext key lives only
    /// for the duration of this call.
    pub async fn send_for_wallet(
        &self,
        wallet_id: &str,
        receivers: &[Receiver],
    ) -> Result<SpendOutcome, SpendError> {
        let envelope = self
            .keys
            .encrypted_key(wallet_id)
            .await
            .map_err(|e| SpendError::NetworkUnavailable(e.to_string()))?
            .ok_or_else(|| SpendError::InvalidRequest(format!("unknown wallet: {wallet_id}")))?;

        let key_hex = custody::decrypt(&self.cipher, &envelope)?;
        self.send(&key_hex, receivers).await
    }

    /// Build, sign and broadcast a spend to `receivers`, funded by the
    /// Taproot address derived from `private_key_hex`.
    ///
    /// The request either broadcasts a fully signed transaction or has no
    /// external effect at all; there is no partial commit.
    pub async fn send(
        &self,
        private_key_hex: &str,
        receivers: &[Receiver],
    ) -> Result<SpendOutcome, SpendError> {
        // Reject malformed requests before any network call.
        if receivers.is_empty() {
            return Err(SpendError::InvalidRequest("no receivers".into()));
        }
        if private_key_hex.trim().is_empty() {
            return Err(SpendError::InvalidRequest("missing private key".into()));
        }

        let receiver_outputs = self.validated_outputs(receivers)?;
        let total_receiver_sat = receiver_outputs
            .iter()
            .try_fold(0u64, |acc, (_, sat)| acc.checked_add(*sat))
            .filter(|total| *total <= MAX_MONEY_SAT)
            .ok_or_else(|| {
                SpendError::InvalidRequest("total amount exceeds the bitcoin supply".into())
            })?;

        let material = KeyMaterial::from_hex(private_key_hex)?;
        let identity = derive_identity(&material.public_key(), self.network);
        let tweaked = tweak_keypair(&material)?;
        let funding_address = identity.address.to_string();
        debug!(%funding_address, total_receiver_sat, "derived funding identity");

        let candidates = self
            .utxos
            .utxos_for_address(&funding_address)
            .await
            .map_err(|e| SpendError::NetworkUnavailable(e.to_string()))?;

        // Reservation is held from selection through broadcast; dropping
        // it on any failure path releases the outpoints.
        let (selection, _reservation) = self.reservations.select_and_reserve(
            &funding_address,
            &candidates,
            |available| select_utxos(available, total_receiver_sat),
        )?;

        let funding_script = identity.address.script_pubkey();
        let mut skeleton = Skeleton::new();
        for utxo in &selection.inputs {
            skeleton.add_input(utxo, funding_script.clone())?;
        }
        for (address, value_sat) in &receiver_outputs {
            skeleton.add_output(address.script_pubkey(), *value_sat);
        }

        let tiers = self
            .fees
            .fee_tiers()
            .await
            .map_err(|e| SpendError::NetworkUnavailable(e.to_string()))?;
        let fee_sat = estimate_fee(&skeleton, &tweaked, &tiers)?;

        // Saturating: a runaway fee rate must read as an unmeetable need,
        // never wrap into an undercounted one.
        let needed_sat = total_receiver_sat.saturating_add(fee_sat);
        if selection.total_sat < needed_sat {
            return Err(SpendError::InsufficientFunds {
                needed_sat,
                available_sat: selection.total_sat,
            });
        }

        let change_sat = selection.total_sat - needed_sat;
        if change_sat > 0 {
            skeleton.add_output(funding_script, change_sat);
        }

        // Conservation: inputs fully split between outputs and fee.
        debug_assert_eq!(
            skeleton.total_input_sat(),
            skeleton.total_output_sat() + fee_sat
        );

        let tx = skeleton.sign_and_finalize(&tweaked)?;
        let raw_hex = to_hex(&tx);

        info!(
            inputs = tx.input.len(),
            outputs = tx.output.len(),
            fee_sat,
            change_sat,
            "broadcasting signed transaction"
        );
        let txid = self
            .broadcaster
            .broadcast(&raw_hex)
            .await
            .map_err(|e| SpendError::NetworkUnavailable(e.to_string()))?;
        info!(%txid, "transaction accepted");

        Ok(SpendOutcome { txid, raw_hex })
    }

    /// Parse receiver addresses for this network and convert amounts from
    /// BTC to satoshis, preserving caller order. Converted amounts must
    /// land between one satoshi and the total supply.
    fn validated_outputs(
        &self,
        receivers: &[Receiver],
    ) -> Result<Vec<(Address, u64)>, SpendError> {
        receivers
            .iter()
            .map(|receiver| {
                if !receiver.amount_btc.is_finite() || receiver.amount_btc <= 0.0 {
                    return Err(SpendError::InvalidRequest(format!(
                        "invalid amount for {}: {}",
                        receiver.address, receiver.amount_btc
                    )));
                }
                let value_sat = btc_to_sat(receiver.amount_btc);
                if value_sat == 0 {
                    return Err(SpendError::InvalidRequest(format!(
                        "amount for {} rounds to zero satoshis",
                        receiver.address
                    )));
                }
                if value_sat > MAX_MONEY_SAT {
                    return Err(SpendError::InvalidRequest(format!(
                        "amount for {} exceeds the bitcoin supply",
                        receiver.address
                    )));
                }
                let address = parse_address(&receiver.address, self.network)?;
                Ok((address, value_sat))
            })
            .collect()
    }
}
