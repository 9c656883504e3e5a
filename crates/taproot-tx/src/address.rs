use bitcoin::address::{Address, NetworkUnchecked};

use crate::error::TaprootError;
use crate::network::Network;

/// Parse and validate a receiver address for the configured network.
pub fn parse_address(address: &str, network: Network) -> Result<Address, TaprootError> {
    address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| TaprootError::InvalidAddress(format!("failed to parse address: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| TaprootError::InvalidAddress(format!("address is for wrong network: {e}")))
}
