use bitcoin::key::TapTweak;
use bitcoin::secp256k1::{Keypair, PublicKey, Secp256k1, SecretKey, XOnlyPublicKey};
use bitcoin::taproot::TapTweakHash;
use bitcoin::Address;
use zeroize::Zeroizing;

use crate::error::TaprootError;
use crate::network::Network;

/// A secp256k1 key pair held in memory for the duration of a single spend.
///
/// Either generated fresh at wallet creation or reconstructed from the
/// custody layer's decrypted hex at spend time. Never persisted as-is.
pub struct KeyMaterial {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyMaterial {
    /// Parse a 64-hex-char private key.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, TaprootError> {
        let bytes = hex::decode(private_key_hex)
            .map_err(|e| TaprootError::InvalidKey(format!("private key is not hex: {e}")))?;
        let secret = SecretKey::from_slice(&bytes)
            .map_err(|e| TaprootError::InvalidKey(format!("invalid secret key: {e}")))?;

        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);

        Ok(Self { secret, public })
    }

    /// Generate a fresh random key pair (wallet creation).
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(&mut rand::thread_rng());
        Self { secret, public }
    }

    /// The compressed 33-byte public point.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The private scalar as hex, in a zeroizing buffer. This is what the
    /// custody layer encrypts at wallet creation.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.secret_bytes()))
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("secret", &"[redacted]")
            .field("public", &self.public)
            .finish()
    }
}

/// The deterministic Taproot identity of a key pair: the internal x-only
/// key, the BIP-341 tweaked output key, and its bech32m address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootIdentity {
    pub internal_key: XOnlyPublicKey,
    pub output_key: XOnlyPublicKey,
    pub address: Address,
}

/// Derive the Taproot identity of a public key (key-path only, no script
/// tree): `Q = P + taggedHash("TapTweak", xOnly(P)) * G`.
pub fn derive_identity(public_key: &PublicKey, network: Network) -> TaprootIdentity {
    let secp = Secp256k1::new();
    let (internal_key, _parity) = public_key.x_only_public_key();
    let (output_key, _) = internal_key.tap_tweak(&secp, None);
    let address = Address::p2tr(&secp, internal_key, None, network.to_bitcoin_network());

    TaprootIdentity {
        internal_key,
        output_key: output_key.to_inner(),
        address,
    }
}

/// Tweak a private key for key-path spending.
///
/// Applies the BIP-341 tweak `d' = (d + t) mod n` where
/// `t = taggedHash("TapTweak", xOnly(P))`; `add_xonly_tweak` negates the
/// scalar first when the public point has an odd y-coordinate, so the
/// tweak lands on the even-y representative. Fails if the tweaked scalar
/// is out of range (zero or >= the curve order).
pub fn tweak_keypair(material: &KeyMaterial) -> Result<Keypair, TaprootError> {
    let secp = Secp256k1::new();
    let keypair = Keypair::from_secret_key(&secp, material.secret_key());
    let (internal_key, _parity) = keypair.x_only_public_key();

    let tweak = TapTweakHash::from_key_and_tweak(internal_key, None).to_scalar();
    keypair
        .add_xonly_tweak(&secp, &tweak)
        .map_err(|e| TaprootError::InvalidKey(format!("tweak produced invalid key: {e}")))
}

/// The tweaked private scalar as raw bytes.
pub fn tweaked_secret_bytes(tweaked: &Keypair) -> [u8; 32] {
    tweaked.secret_key().secret_bytes()
}
