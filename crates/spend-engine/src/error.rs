use custody::CustodyError;
use taproot_tx::TaprootError;
use thiserror::Error;

/// The closed set of failures a spend request can surface.
///
/// Callers branch on the variant, not on message text. Error payloads
/// never contain private key bytes or intermediate signatures.
#[derive(Debug, Error)]
pub enum SpendError {
    /// Malformed input (empty receivers, missing key, bad address or
    /// amount). Rejected before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Confirmed funds do not cover receivers plus fee. Raised after UTXO
    /// and fee computation, before any signing of the final transaction.
    #[error("insufficient funds: needed {needed_sat} sat, available {available_sat} sat")]
    InsufficientFunds { needed_sat: u64, available_sat: u64 },

    /// Key material cannot be parsed or tweaked.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The stored ciphertext failed authenticated decryption; no key ever
    /// reached the builder.
    #[error("authentication failed: stored key material rejected")]
    AuthenticationFailed,

    /// A collaborator call (UTXO fetch, fee fetch, broadcast) failed. Not
    /// retried here; retry policy belongs to the calling layer.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl SpendError {
    /// HTTP-style severity class for the caller-facing boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            SpendError::InvalidRequest(_) | SpendError::InvalidKey(_) => 400,
            SpendError::InsufficientFunds { .. } => 403,
            SpendError::AuthenticationFailed => 403,
            SpendError::NetworkUnavailable(_) => 502,
        }
    }
}

impl From<TaprootError> for SpendError {
    fn from(err: TaprootError) -> Self {
        match err {
            TaprootError::InvalidKey(msg) | TaprootError::SigningError(msg) => {
                SpendError::InvalidKey(msg)
            }
            TaprootError::InsufficientFunds {
                needed_sat,
                available_sat,
            } => SpendError::InsufficientFunds {
                needed_sat,
                available_sat,
            },
            TaprootError::InvalidAddress(msg) | TaprootError::BuildError(msg) => {
                SpendError::InvalidRequest(msg)
            }
        }
    }
}

impl From<CustodyError> for SpendError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::InvalidConfig(msg) | CustodyError::EncryptionFailed(msg) => {
                SpendError::InvalidRequest(msg)
            }
            // Tampered and malformed envelopes fail closed the same way.
            CustodyError::AuthenticationFailed | CustodyError::InvalidEnvelope(_) => {
                SpendError::AuthenticationFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_by_kind() {
        assert_eq!(SpendError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(SpendError::InvalidKey("x".into()).status_code(), 400);
        assert_eq!(
            SpendError::InsufficientFunds {
                needed_sat: 2,
                available_sat: 1
            }
            .status_code(),
            403
        );
        assert_eq!(SpendError::AuthenticationFailed.status_code(), 403);
        assert_eq!(
            SpendError::NetworkUnavailable("x".into()).status_code(),
            502
        );
    }

    #[test]
    fn insufficient_funds_carries_both_amounts() {
        let err: SpendError = TaprootError::InsufficientFunds {
            needed_sat: 61_154,
            available_sat: 50_000,
        }
        .into();

        match err {
            SpendError::InsufficientFunds {
                needed_sat,
                available_sat,
            } => {
                assert_eq!(needed_sat, 61_154);
                assert_eq!(available_sat, 50_000);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn custody_tamper_maps_to_authentication_failed() {
        let err: SpendError = CustodyError::AuthenticationFailed.into();
        assert!(matches!(err, SpendError::AuthenticationFailed));

        let err: SpendError = CustodyError::InvalidEnvelope("short".into()).into();
        assert!(matches!(err, SpendError::AuthenticationFailed));
    }

    #[test]
    fn key_errors_map_to_invalid_key() {
        let err: SpendError = TaprootError::InvalidKey("bad scalar".into()).into();
        assert!(matches!(err, SpendError::InvalidKey(_)));
    }
}
