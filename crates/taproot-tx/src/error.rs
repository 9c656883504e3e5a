use thiserror::Error;

/// Taproot transaction-core errors.
#[derive(Debug, Error)]
pub enum TaprootError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient funds: needed {needed_sat} sat, available {available_sat} sat")]
    InsufficientFunds { needed_sat: u64, available_sat: u64 },

    #[error("transaction build error: {0}")]
    BuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}
