use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::{Keypair, Message, Secp256k1};
use bitcoin::sighash::{Prevouts, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, OutPoint, Sequence, TapSighashType, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::error::TaprootError;
use crate::utxo::Utxo;

/// An in-progress spend: ordered inputs with their prevouts and ordered
/// outputs, mutable until signed. [`sign_and_finalize`](Skeleton::sign_and_finalize)
/// consumes it and yields the immutable signed transaction.
#[derive(Debug, Clone)]
pub struct Skeleton {
    tx: Transaction,
    prevouts: Vec<TxOut>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self {
            tx: Transaction {
                version: Version::TWO,
                lock_time: LockTime::ZERO,
                input: Vec::new(),
                output: Vec::new(),
            },
            prevouts: Vec::new(),
        }
    }

    /// Append a funding input spending `utxo`. The input's sequence is
    /// `0xFFFFFFFD`: opt-in replace-by-fee, relative timelock disabled.
    /// `funding_script` is the scriptPubKey of the Taproot output being
    /// spent, kept as the prevout for sighash computation.
    pub fn add_input(&mut self, utxo: &Utxo, funding_script: ScriptBuf) -> Result<(), TaprootError> {
        let txid: Txid = utxo
            .txid
            .parse()
            .map_err(|e| TaprootError::BuildError(format!("invalid txid: {e}")))?;

        self.tx.input.push(TxIn {
            previous_output: OutPoint::new(txid, utxo.vout),
            script_sig: ScriptBuf::new(), // Always empty for Taproot.
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::default(),
        });
        self.prevouts.push(TxOut {
            value: Amount::from_sat(utxo.value_sat),
            script_pubkey: funding_script,
        });

        Ok(())
    }

    /// Append an output paying `value_sat` to `script`. Receiver outputs
    /// keep caller order; the change output, if any, goes last.
    pub fn add_output(&mut self, script: ScriptBuf, value_sat: u64) {
        self.tx.output.push(TxOut {
            value: Amount::from_sat(value_sat),
            script_pubkey: script,
        });
    }

    pub fn input_count(&self) -> usize {
        self.tx.input.len()
    }

    pub fn output_count(&self) -> usize {
        self.tx.output.len()
    }

    /// Total value of all inputs, in satoshis.
    pub fn total_input_sat(&self) -> u64 {
        self.prevouts.iter().map(|p| p.value.to_sat()).sum()
    }

    /// Total value of all outputs, in satoshis.
    pub fn total_output_sat(&self) -> u64 {
        self.tx.output.iter().map(|o| o.value.to_sat()).sum()
    }

    /// Sign every input with a key-path Schnorr signature from `tweaked`
    /// and attach the final witnesses.
    ///
    /// All inputs must spend outputs controlled by the same tweaked key.
    /// Consumes the skeleton; the returned transaction is final.
    pub fn sign_and_finalize(mut self, tweaked: &Keypair) -> Result<Transaction, TaprootError> {
        let secp = Secp256k1::new();
        let unsigned = self.tx.clone();
        let mut sighash_cache = SighashCache::new(&unsigned);
        let prevouts = Prevouts::All(&self.prevouts);

        for input_index in 0..self.tx.input.len() {
            let sighash = sighash_cache
                .taproot_key_spend_signature_hash(
                    input_index,
                    &prevouts,
                    TapSighashType::Default,
                )
                .map_err(|e| {
                    TaprootError::SigningError(format!("sighash computation failed: {e}"))
                })?;

            let msg = Message::from_digest(sighash.to_byte_array());
            let signature = secp.sign_schnorr_no_aux_rand(&msg, tweaked);

            let taproot_sig = bitcoin::taproot::Signature {
                signature,
                sighash_type: TapSighashType::Default,
            };
            self.tx.input[input_index].witness = Witness::p2tr_key_spend(&taproot_sig);
        }

        Ok(self.tx)
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a finalized transaction to raw hex for broadcast.
pub fn to_hex(tx: &Transaction) -> String {
    bitcoin::consensus::encode::serialize_hex(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{derive_identity, tweak_keypair, KeyMaterial};
    use crate::network::Network;
    use crate::utxo::Utxo;

    fn funding_setup() -> (KeyMaterial, ScriptBuf, Keypair) {
        let material = KeyMaterial::from_hex(&"42".repeat(32)).unwrap();
        let identity = derive_identity(&material.public_key(), Network::Testnet);
        let script = identity.address.script_pubkey();
        let tweaked = tweak_keypair(&material).unwrap();
        (material, script, tweaked)
    }

    fn confirmed_utxo(fill: &str, value_sat: u64) -> Utxo {
        Utxo {
            txid: fill.repeat(64),
            vout: 0,
            value_sat,
            confirmed: true,
            block_height: Some(850_000),
        }
    }

    #[test]
    fn inputs_use_rbf_sequence() {
        let (_, script, _) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 100_000), script)
            .unwrap();

        assert_eq!(skeleton.tx.input[0].sequence.to_consensus_u32(), 0xFFFFFFFD);
    }

    #[test]
    fn invalid_txid_is_rejected() {
        let (_, script, _) = funding_setup();
        let mut skeleton = Skeleton::new();
        let mut utxo = confirmed_utxo("a", 100_000);
        utxo.txid = "nothex".into();

        let result = skeleton.add_input(&utxo, script);
        assert!(matches!(result, Err(TaprootError::BuildError(_))));
    }

    #[test]
    fn totals_track_inputs_and_outputs() {
        let (_, script, _) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 100_000), script.clone())
            .unwrap();
        skeleton
            .add_input(&confirmed_utxo("b", 50_000), script.clone())
            .unwrap();
        skeleton.add_output(script.clone(), 30_000);
        skeleton.add_output(script, 110_000);

        assert_eq!(skeleton.total_input_sat(), 150_000);
        assert_eq!(skeleton.total_output_sat(), 140_000);
        assert_eq!(skeleton.input_count(), 2);
        assert_eq!(skeleton.output_count(), 2);
    }

    #[test]
    fn signing_attaches_key_path_witnesses() {
        let (_, script, tweaked) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 200_000), script.clone())
            .unwrap();
        skeleton.add_output(script, 199_000);

        let tx = skeleton.sign_and_finalize(&tweaked).unwrap();

        // Key-path witness is a single 64-byte Schnorr signature
        // (Default sighash type adds no trailing byte).
        assert_eq!(tx.input[0].witness.len(), 1);
        assert_eq!(tx.input[0].witness.iter().next().unwrap().len(), 64);
    }

    #[test]
    fn signing_covers_every_input() {
        let (_, script, tweaked) = funding_setup();
        let mut skeleton = Skeleton::new();
        for fill in ["a", "b", "c"] {
            skeleton
                .add_input(&confirmed_utxo(fill, 50_000), script.clone())
                .unwrap();
        }
        skeleton.add_output(script, 149_000);

        let tx = skeleton.sign_and_finalize(&tweaked).unwrap();
        assert!(tx.input.iter().all(|i| !i.witness.is_empty()));
    }

    #[test]
    fn value_is_conserved_through_signing() {
        let (_, script, tweaked) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 200_000), script.clone())
            .unwrap();
        skeleton.add_output(script.clone(), 1_000);
        skeleton.add_output(script, 198_846);

        let inputs = skeleton.total_input_sat();
        let tx = skeleton.sign_and_finalize(&tweaked).unwrap();
        let outputs: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();

        assert_eq!(inputs, outputs + 154);
    }

    #[test]
    fn serialized_hex_decodes_back() {
        let (_, script, tweaked) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 200_000), script.clone())
            .unwrap();
        skeleton.add_output(script, 199_500);

        let tx = skeleton.sign_and_finalize(&tweaked).unwrap();
        let raw = to_hex(&tx);

        let bytes = hex::decode(&raw).unwrap();
        let decoded: Transaction = bitcoin::consensus::encode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.compute_txid(), tx.compute_txid());
    }

    #[test]
    fn single_input_two_output_vsize_is_154() {
        // The minimum viable spend shape behind the 154-sat fee floor.
        let (_, script, tweaked) = funding_setup();
        let mut skeleton = Skeleton::new();
        skeleton
            .add_input(&confirmed_utxo("a", 200_000), script.clone())
            .unwrap();
        skeleton.add_output(script.clone(), 1_000);
        skeleton.add_output(script, 198_846);

        let tx = skeleton.sign_and_finalize(&tweaked).unwrap();
        assert_eq!(tx.vsize(), 154);
    }
}
