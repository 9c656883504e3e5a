use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CustodyError;

/// AES-256-GCM nonce size in bytes. The only IV length the cipher accepts.
pub const GCM_IV_LEN: usize = 12;

/// Process-wide cipher configuration.
///
/// Constructed once at startup from configuration and passed by reference
/// into the custody functions; immutable thereafter. The cipher key is
/// wiped from memory when the config is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherConfig {
    key: [u8; 32],
    #[zeroize(skip)]
    iv_length: usize,
}

impl CipherConfig {
    /// Build a configuration from a 64-hex-char AES-256 key and an IV length.
    ///
    /// The IV length is validated up front: AES-GCM uses a 96-bit nonce, so
    /// anything other than 12 is rejected rather than discovered at the
    /// first encrypt call.
    pub fn new(key_hex: &str, iv_length: usize) -> Result<Self, CustodyError> {
        let key_bytes = hex::decode(key_hex)
            .map_err(|e| CustodyError::InvalidConfig(format!("cipher key is not hex: {e}")))?;

        let key: [u8; 32] = key_bytes.try_into().map_err(|v: Vec<u8>| {
            CustodyError::InvalidConfig(format!(
                "cipher key must be 32 bytes, got {}",
                v.len()
            ))
        })?;

        if iv_length != GCM_IV_LEN {
            return Err(CustodyError::InvalidConfig(format!(
                "IV length must be {GCM_IV_LEN} for AES-256-GCM, got {iv_length}"
            )));
        }

        Ok(Self { key, iv_length })
    }

    /// The raw 32-byte cipher key.
    pub(crate) fn key(&self) -> &[u8; 32] {
        &self.key
    }

    /// Configured IV length in bytes.
    pub fn iv_length(&self) -> usize {
        self.iv_length
    }
}

impl std::fmt::Debug for CipherConfig {
    // Never expose key bytes through Debug.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig")
            .field("key", &"[redacted]")
            .field("iv_length", &self.iv_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn valid_config_is_accepted() {
        let config = CipherConfig::new(KEY_HEX, 12).unwrap();
        assert_eq!(config.iv_length(), 12);
    }

    #[test]
    fn short_key_is_rejected() {
        let result = CipherConfig::new("0011223344", 12);
        assert!(matches!(result, Err(CustodyError::InvalidConfig(_))));
    }

    #[test]
    fn non_hex_key_is_rejected() {
        let result = CipherConfig::new(&"zz".repeat(32), 12);
        assert!(matches!(result, Err(CustodyError::InvalidConfig(_))));
    }

    #[test]
    fn unsupported_iv_length_is_rejected() {
        let result = CipherConfig::new(KEY_HEX, 16);
        assert!(matches!(result, Err(CustodyError::InvalidConfig(_))));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let config = CipherConfig::new(KEY_HEX, 12).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("010203"));
    }
}
