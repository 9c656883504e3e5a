use serde::{Deserialize, Serialize};

/// A caller-supplied payment target. The amount is in BTC and is converted
/// to satoshis at the engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub address: String,
    #[serde(rename = "amount")]
    pub amount_btc: f64,
}

/// A successful spend: the network-assigned txid and the raw transaction
/// hex that was broadcast. Deployments pick which one they report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendOutcome {
    pub txid: String,
    pub raw_hex: String,
}
