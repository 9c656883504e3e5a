use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;

use taproot_tx::error::TaprootError;
use taproot_tx::utxo::{Selection, Utxo};

/// An outpoint key: (txid, vout).
pub type Outpoint = (String, u32);

/// Per-address reservation of outpoints for in-flight spends.
///
/// Two concurrent spends from the same funding address would otherwise
/// select overlapping UTXOs and produce conflicting transactions. The
/// table excludes already-reserved outpoints from a build's candidate set
/// and reserves the selected ones atomically, holding the reservation from
/// selection through broadcast. The guard releases on drop, so an aborted
/// build leaves nothing behind.
#[derive(Debug, Default)]
pub struct ReservationTable {
    inner: Mutex<HashMap<String, HashSet<Outpoint>>>,
}

impl ReservationTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `select` over the candidates not currently reserved for
    /// `address`, and reserve the selected outpoints, all under one lock.
    pub fn select_and_reserve<F>(
        self: &Arc<Self>,
        address: &str,
        candidates: &[Utxo],
        select: F,
    ) -> Result<(Selection, ReservationGuard), TaprootError>
    where
        F: FnOnce(&[Utxo]) -> Result<Selection, TaprootError>,
    {
        let mut table = self.inner.lock().expect("reservation table poisoned");
        let reserved = table.entry(address.to_string()).or_default();

        let available: Vec<Utxo> = candidates
            .iter()
            .filter(|u| !reserved.contains(&u.outpoint()))
            .cloned()
            .collect();

        let selection = select(&available)?;

        let outpoints: Vec<Outpoint> = selection.inputs.iter().map(|u| u.outpoint()).collect();
        for outpoint in &outpoints {
            reserved.insert(outpoint.clone());
        }
        debug!(address, count = outpoints.len(), "reserved outpoints");

        let guard = ReservationGuard {
            table: Arc::clone(self),
            address: address.to_string(),
            outpoints,
        };
        Ok((selection, guard))
    }

    /// Outpoints currently reserved for `address`.
    pub fn reserved_for(&self, address: &str) -> HashSet<Outpoint> {
        self.inner
            .lock()
            .expect("reservation table poisoned")
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    fn release(&self, address: &str, outpoints: &[Outpoint]) {
        let mut table = self.inner.lock().expect("reservation table poisoned");
        if let Some(reserved) = table.get_mut(address) {
            for outpoint in outpoints {
                reserved.remove(outpoint);
            }
            if reserved.is_empty() {
                table.remove(address);
            }
        }
    }
}

/// Holds a set of reserved outpoints; releases them on drop.
#[derive(Debug)]
pub struct ReservationGuard {
    table: Arc<ReservationTable>,
    address: String,
    outpoints: Vec<Outpoint>,
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        self.table.release(&self.address, &self.outpoints);
        debug!(address = %self.address, count = self.outpoints.len(), "released outpoints");
    }
}
