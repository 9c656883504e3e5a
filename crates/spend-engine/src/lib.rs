//! # spend-engine
//!
//! Orchestrates a custodial Taproot spend end to end: receiver validation,
//! identity derivation, UTXO selection with per-address reservation, fee
//! estimation, change, key-path signing, and hand-off to the broadcast
//! collaborator.
//!
//! Each spend request is independent and stateless across requests; the
//! only shared state is the immutable cipher configuration and the UTXO
//! reservation table guarding concurrent spends from the same address.

pub mod builder;
pub mod error;
pub mod reservation;
pub mod sources;
pub mod types;

pub use builder::SpendEngine;
pub use error::SpendError;
pub use types::{Receiver, SpendOutcome};
