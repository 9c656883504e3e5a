//! # custody
//!
//! At-rest protection for custodial private keys.
//!
//! Keys are sealed with AES-256-GCM under a process-wide cipher key and a
//! fresh random IV per call, and stored as a single hex envelope
//! `iv || ciphertext || tag`. Decryption fails closed on any tampering.

pub mod config;
pub mod envelope;
pub mod error;
pub mod random;

pub use config::CipherConfig;
pub use envelope::{decrypt, encrypt};
pub use error::CustodyError;
