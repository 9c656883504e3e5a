//! # taproot-tx
//!
//! Single-key-path Taproot transaction primitives: BIP-341 output-key
//! derivation and private-key tweaking, confirmed-UTXO selection, fee
//! estimation from network fee-rate tiers, and transaction assembly,
//! signing, finalization and serialization.
//!
//! Everything here is pure computation; fetching UTXOs, fee rates, and
//! broadcasting live behind the collaborator traits in `spend-engine`.

pub mod address;
pub mod amount;
pub mod error;
pub mod fee;
pub mod keys;
pub mod network;
pub mod transaction;
pub mod utxo;

pub use error::TaprootError;
pub use network::Network;
