//! Conflict-detection sets derived from a transaction's declared accesses

use blockpar_primitives::{Address, H256};
use blockpar_types::{AccessSet, SlotMap};
use std::collections::{HashMap, HashSet};

/// Policy applied when deriving footprints, fixed for a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    /// Treat every contract whose storage a transaction writes as a written
    /// address, so two writers of the same contract's storage always conflict
    pub storage_root_conflicts: bool,
    /// Addresses that never create a conflict (system-level accounts)
    pub ignored_addresses: HashSet<Address>,
}

impl ConflictPolicy {
    /// Policy with widening off and no ignored addresses
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable storage-root widening
    pub fn with_storage_root_conflicts(mut self, enabled: bool) -> Self {
        self.storage_root_conflicts = enabled;
        self
    }

    /// Exclude an address from conflict detection
    pub fn ignore_address(mut self, address: Address) -> Self {
        self.ignored_addresses.insert(address);
        self
    }

    fn keeps(&self, address: &Address) -> bool {
        !self.ignored_addresses.contains(address)
    }
}

/// Storage slots per contract, keyed for fast lookup
pub type StorageSet = HashMap<Address, HashSet<H256>>;

/// Read/write sets of one transaction, as used by conflict detection.
///
/// A transaction's writes are also counted as its reads, so any later
/// writer of the same address or slot is ordered after it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Addresses written (widened by storage writes under the storage-root policy)
    pub write_addresses: HashSet<Address>,
    /// Declared reads plus all writes
    pub read_addresses: HashSet<Address>,
    /// Storage slots written, per contract
    pub write_storage: StorageSet,
    /// Declared storage reads plus storage writes
    pub read_storage: StorageSet,
}

impl Footprint {
    /// Derive the footprint of a transaction's declared accesses
    pub fn from_access(access: &AccessSet, policy: &ConflictPolicy) -> Self {
        let mut write_addresses: HashSet<Address> = access
            .writes
            .iter()
            .filter(|address| policy.keeps(address))
            .copied()
            .collect();
        let write_storage = storage_set(&access.storage_writes, policy);

        if policy.storage_root_conflicts {
            write_addresses.extend(write_storage.keys().copied());
        }

        let mut read_addresses: HashSet<Address> = access
            .reads
            .iter()
            .filter(|address| policy.keeps(address))
            .copied()
            .collect();
        read_addresses.extend(write_addresses.iter().copied());

        let mut read_storage = storage_set(&access.storage_reads, policy);
        for (contract, slots) in &write_storage {
            read_storage
                .entry(*contract)
                .or_default()
                .extend(slots.iter().copied());
        }

        Self {
            write_addresses,
            read_addresses,
            write_storage,
            read_storage,
        }
    }

    /// Check if `self` reads an address that `other` writes
    pub fn reads_address_written_by(&self, other: &Footprint) -> bool {
        intersects(&self.read_addresses, &other.write_addresses)
    }

    /// Check if `self` reads a storage slot that `other` writes
    pub fn reads_slot_written_by(&self, other: &Footprint) -> bool {
        self.read_storage.iter().any(|(contract, read_slots)| {
            other
                .write_storage
                .get(contract)
                .is_some_and(|written| intersects(read_slots, written))
        })
    }

    /// Check if the footprint touches nothing
    pub fn is_empty(&self) -> bool {
        self.read_addresses.is_empty() && self.read_storage.is_empty()
    }
}

fn storage_set(slots: &SlotMap, policy: &ConflictPolicy) -> StorageSet {
    slots
        .iter()
        .filter(|(contract, _)| policy.keeps(contract))
        .map(|(contract, keys)| (*contract, keys.iter().copied().collect()))
        .collect()
}

fn intersects<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|item| large.contains(item))
}
