use thiserror::Error;

/// Key custody operation errors.
#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("invalid cipher configuration: {0}")]
    InvalidConfig(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The stored envelope failed authenticated decryption. Covers both a
    /// wrong cipher key and any modification of the stored ciphertext.
    #[error("authentication failed: ciphertext rejected")]
    AuthenticationFailed,

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}
