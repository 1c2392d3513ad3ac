//! Block trace record

use crate::access::null_as_empty;
use crate::error::TypesError;
use crate::transaction::TxTrace;
use blockpar_primitives::{BlockNumber, Gas, H256};
use serde::{Deserialize, Serialize};

/// A traced block: header fields plus its transactions in execution order.
///
/// The order of `txs` is the semantic order every analysis must respect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTrace {
    /// Block number
    #[serde(rename = "Block", alias = "block", alias = "number", default)]
    pub block: BlockNumber,
    /// Block hash
    #[serde(rename = "Hash", alias = "hash", default)]
    pub hash: H256,
    /// Gas used as declared by the block header
    #[serde(rename = "GasUsed", alias = "gas_used", alias = "gasUsed", default)]
    pub gas_used: Gas,
    /// Transactions in block order
    #[serde(
        rename = "Txs",
        alias = "txs",
        alias = "transactions",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub txs: Vec<TxTrace>,
}

impl BlockTrace {
    /// Create a block from its transactions, declaring their summed cost as gas used
    pub fn new(block: BlockNumber, txs: Vec<TxTrace>) -> Self {
        let gas_used = txs.iter().map(|tx| tx.gas_used).fold(0, Gas::saturating_add);
        Self {
            block,
            hash: H256::from_low_u64(block),
            gas_used,
            txs,
        }
    }

    /// Check that every transaction's index equals its position
    pub fn validate(&self) -> Result<(), TypesError> {
        match self
            .txs
            .iter()
            .enumerate()
            .find(|(position, tx)| tx.index != *position)
        {
            Some((position, tx)) => Err(TypesError::IndexMismatch {
                position,
                declared: tx.index,
            }),
            None => Ok(()),
        }
    }

    /// Sum of all transaction costs (the fully serial execution time),
    /// saturating at `Gas::MAX`
    pub fn total_tx_gas(&self) -> Gas {
        self.txs
            .iter()
            .map(|tx| tx.gas_used)
            .fold(0, Gas::saturating_add)
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Check if the block has no transactions
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_block() {
        let json = r#"{
            "Block": 16026516,
            "Hash": "0x00000000000000000000000000000000000000000000000000000000000000ff",
            "GasUsed": 222,
            "Txs": []
        }"#;
        let block: BlockTrace = serde_json::from_str(json).unwrap();

        assert_eq!(block.block, 16026516);
        assert_eq!(block.gas_used, 222);
        assert!(block.is_empty());
        assert!(block.validate().is_ok());
        assert_eq!(block.total_tx_gas(), 0);
    }

    #[test]
    fn test_decode_missing_or_null_txs() {
        let missing: BlockTrace = serde_json::from_str(r#"{"Block": 1}"#).unwrap();
        let null: BlockTrace = serde_json::from_str(r#"{"Block": 1, "Txs": null}"#).unwrap();
        assert!(missing.is_empty());
        assert!(null.is_empty());
    }

    #[test]
    fn test_validate_index_mismatch() {
        let block = BlockTrace::new(1, vec![TxTrace::new(0, 10), TxTrace::new(2, 10)]);
        assert_eq!(
            block.validate(),
            Err(TypesError::IndexMismatch {
                position: 1,
                declared: 2
            })
        );
    }

    #[test]
    fn test_new_sums_gas() {
        let block = BlockTrace::new(5, vec![TxTrace::new(0, 100), TxTrace::new(1, 200)]);
        assert_eq!(block.gas_used, 300);
        assert_eq!(block.total_tx_gas(), 300);
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_total_gas_saturates() {
        let block = BlockTrace::new(
            5,
            vec![TxTrace::new(0, Gas::MAX), TxTrace::new(1, 21_000)],
        );
        assert_eq!(block.total_tx_gas(), Gas::MAX);
        assert_eq!(block.gas_used, Gas::MAX);
    }

    #[test]
    fn test_declared_gas_can_differ_from_tx_sum() {
        let mut block = BlockTrace::new(5, vec![TxTrace::new(0, 100)]);
        block.gas_used = 150;
        assert_eq!(block.total_tx_gas(), 100);
    }
}
