use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use zeroize::Zeroizing;

use crate::config::CipherConfig;
use crate::error::CustodyError;
use crate::random::random_bytes;

/// AES-GCM authentication tag size in bytes.
const TAG_LEN: usize = 16;

/// Encrypts a plaintext private key (hex string) for at-rest storage.
///
/// A random IV of the configured length is generated per call. The result
/// is the hex concatenation `iv || ciphertext || tag`; the aead crate
/// appends the 16-byte tag to the ciphertext, so the envelope is simply
/// the IV followed by the sealed payload.
pub fn encrypt(config: &CipherConfig, plaintext_key_hex: &str) -> Result<String, CustodyError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(config.key()));
    let iv = random_bytes(config.iv_length());
    let nonce = Nonce::from_slice(&iv);

    let sealed = cipher
        .encrypt(nonce, plaintext_key_hex.as_bytes())
        .map_err(|e| CustodyError::EncryptionFailed(e.to_string()))?;

    let mut envelope = String::with_capacity(2 * (iv.len() + sealed.len()));
    envelope.push_str(&hex::encode(&iv));
    envelope.push_str(&hex::encode(&sealed));

    Ok(envelope)
}

/// Decrypts an envelope produced by [`encrypt`] back to the plaintext key.
///
/// The IV is sliced off the front at the configured length; the remainder
/// (ciphertext plus trailing 16-byte tag) goes to the AEAD open. Any tag
/// mismatch, from tampering or a wrong cipher key, fails closed with
/// [`CustodyError::AuthenticationFailed`]. The plaintext is returned in a
/// zeroizing buffer so it is wiped once the spend that needed it is done.
pub fn decrypt(config: &CipherConfig, envelope_hex: &str) -> Result<Zeroizing<String>, CustodyError> {
    let bytes = hex::decode(envelope_hex)
        .map_err(|e| CustodyError::InvalidEnvelope(format!("envelope is not hex: {e}")))?;

    let min_len = config.iv_length() + TAG_LEN;
    if bytes.len() < min_len {
        return Err(CustodyError::InvalidEnvelope(format!(
            "envelope too short: expected at least {min_len} bytes, got {}",
            bytes.len()
        )));
    }

    let (iv, sealed) = bytes.split_at(config.iv_length());
    let nonce = Nonce::from_slice(iv);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(config.key()));

    let plaintext = cipher
        .decrypt(nonce, sealed)
        .map_err(|_| CustodyError::AuthenticationFailed)?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|_| CustodyError::InvalidEnvelope("plaintext is not UTF-8".into()))
}
