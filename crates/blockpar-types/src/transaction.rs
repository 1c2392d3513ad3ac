//! Transaction trace record

use crate::access::AccessSet;
use blockpar_primitives::{Address, Gas, TxIndex, H256};
use serde::{Deserialize, Serialize};

/// One transaction of a traced block.
///
/// `index` is the transaction's position in block order and its identity
/// throughout the analysis. Accesses are read either inline or nested under
/// an `Accesses` object; both layouts are merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TxRecord")]
pub struct TxTrace {
    /// Position in the block
    #[serde(rename = "Index")]
    pub index: TxIndex,
    /// Transaction hash
    #[serde(rename = "Hash")]
    pub hash: H256,
    /// Flat execution cost
    #[serde(rename = "GasUsed")]
    pub gas_used: Gas,
    /// Declared accesses
    #[serde(flatten)]
    pub access: AccessSet,
}

/// Wire form of [`TxTrace`]
#[derive(Deserialize)]
struct TxRecord {
    #[serde(rename = "Index", alias = "index")]
    index: TxIndex,
    #[serde(rename = "Hash", alias = "hash", default)]
    hash: H256,
    #[serde(rename = "GasUsed", alias = "gas_used", alias = "gasUsed", alias = "cost", default)]
    gas_used: Gas,
    #[serde(rename = "Accesses", alias = "accesses", default)]
    nested: Option<AccessSet>,
    #[serde(flatten)]
    inline: AccessSet,
}

impl From<TxRecord> for TxTrace {
    fn from(record: TxRecord) -> Self {
        let mut access = record.inline;
        if let Some(nested) = record.nested {
            access.merge(nested);
        }
        Self {
            index: record.index,
            hash: record.hash,
            gas_used: record.gas_used,
            access,
        }
    }
}

impl TxTrace {
    /// Create a trace with no accesses
    pub fn new(index: TxIndex, gas_used: Gas) -> Self {
        Self {
            index,
            hash: H256::from_low_u64(index as u64),
            gas_used,
            access: AccessSet::new(),
        }
    }

    /// Set the hash
    pub fn with_hash(mut self, hash: H256) -> Self {
        self.hash = hash;
        self
    }

    /// Add an address read
    pub fn reads(mut self, address: Address) -> Self {
        self.access.record_read(address);
        self
    }

    /// Add an address write
    pub fn writes(mut self, address: Address) -> Self {
        self.access.record_write(address);
        self
    }

    /// Add a storage slot read
    pub fn reads_slot(mut self, contract: Address, slot: H256) -> Self {
        self.access.record_storage_read(contract, slot);
        self
    }

    /// Add a storage slot write
    pub fn writes_slot(mut self, contract: Address, slot: H256) -> Self {
        self.access.record_storage_write(contract, slot);
        self
    }
}
