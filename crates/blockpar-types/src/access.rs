//! Declared read/write footprint of a transaction

use blockpar_primitives::{Address, H256};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Storage slots touched per contract address
pub type SlotMap = BTreeMap<Address, BTreeSet<H256>>;

/// Account and storage accesses declared by a transaction trace.
///
/// Every field may be absent or `null` in the trace; both decode to an
/// empty collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSet {
    /// Addresses read
    #[serde(rename = "Reads", alias = "reads", default, deserialize_with = "null_as_empty")]
    pub reads: BTreeSet<Address>,
    /// Addresses written
    #[serde(rename = "Writes", alias = "writes", default, deserialize_with = "null_as_empty")]
    pub writes: BTreeSet<Address>,
    /// Storage slots read, per contract
    #[serde(
        rename = "StorageReads",
        alias = "storage_reads",
        alias = "storageReads",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub storage_reads: SlotMap,
    /// Storage slots written, per contract
    #[serde(
        rename = "StorageWrites",
        alias = "storage_writes",
        alias = "storageWrites",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub storage_writes: SlotMap,
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AccessSet {
    /// Create an empty access set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an address read
    pub fn record_read(&mut self, address: Address) {
        self.reads.insert(address);
    }

    /// Record an address write
    pub fn record_write(&mut self, address: Address) {
        self.writes.insert(address);
    }

    /// Record a storage slot read
    pub fn record_storage_read(&mut self, contract: Address, slot: H256) {
        self.storage_reads.entry(contract).or_default().insert(slot);
    }

    /// Record a storage slot write
    pub fn record_storage_write(&mut self, contract: Address, slot: H256) {
        self.storage_writes.entry(contract).or_default().insert(slot);
    }

    /// Add every access of `other` to this set
    pub fn merge(&mut self, other: AccessSet) {
        self.reads.extend(other.reads);
        self.writes.extend(other.writes);
        for (contract, slots) in other.storage_reads {
            self.storage_reads.entry(contract).or_default().extend(slots);
        }
        for (contract, slots) in other.storage_writes {
            self.storage_writes.entry(contract).or_default().extend(slots);
        }
    }

    /// Total number of recorded accesses (addresses plus slots)
    pub fn access_count(&self) -> usize {
        let slots = |map: &SlotMap| map.values().map(BTreeSet::len).sum::<usize>();
        self.reads.len()
            + self.writes.len()
            + slots(&self.storage_reads)
            + slots(&self.storage_writes)
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.access_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(id: u8) -> Address {
        Address::from_bytes([id; 20])
    }

    #[test]
    fn test_missing_fields_decode_empty() {
        let access: AccessSet = serde_json::from_str("{}").unwrap();
        assert!(access.is_empty());
    }

    #[test]
    fn test_null_fields_decode_empty() {
        let json = r#"{"Reads": null, "Writes": null, "StorageReads": null, "StorageWrites": null}"#;
        let access: AccessSet = serde_json::from_str(json).unwrap();
        assert!(access.is_empty());
    }

    #[test]
    fn test_decode_storage_maps() {
        let json = format!(
            r#"{{"StorageWrites": {{"{}": ["0x1", "0x02"]}}}}"#,
            addr(7).to_hex()
        );
        let access: AccessSet = serde_json::from_str(&json).unwrap();
        let slots = &access.storage_writes[&addr(7)];
        assert!(slots.contains(&H256::from_low_u64(1)));
        assert!(slots.contains(&H256::from_low_u64(2)));
        assert_eq!(access.access_count(), 2);
    }

    #[test]
    fn test_snake_case_aliases() {
        let json = format!(r#"{{"reads": ["{}"], "storage_reads": {{}}}}"#, addr(1).to_hex());
        let access: AccessSet = serde_json::from_str(&json).unwrap();
        assert!(access.reads.contains(&addr(1)));
    }

    #[test]
    fn test_merge_unions_slots() {
        let mut left = AccessSet::new();
        left.record_read(addr(1));
        left.record_storage_write(addr(3), H256::from_low_u64(1));
        let mut right = AccessSet::new();
        right.record_read(addr(1));
        right.record_storage_write(addr(3), H256::from_low_u64(2));

        left.merge(right);
        assert_eq!(left.reads.len(), 1);
        assert_eq!(left.storage_writes[&addr(3)].len(), 2);
    }

    #[test]
    fn test_record_helpers() {
        let mut access = AccessSet::new();
        access.record_read(addr(1));
        access.record_write(addr(2));
        access.record_storage_read(addr(3), H256::from_low_u64(1));
        access.record_storage_write(addr(3), H256::from_low_u64(1));
        access.record_storage_write(addr(3), H256::from_low_u64(1));

        assert_eq!(access.access_count(), 4);
        assert!(!access.is_empty());
    }
}
