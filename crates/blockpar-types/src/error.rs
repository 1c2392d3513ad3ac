//! Error types for trace records

use blockpar_primitives::TxIndex;
use thiserror::Error;

/// Trace validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    /// A transaction's declared index does not match its position in the block
    #[error("transaction at position {position} declares index {declared}")]
    IndexMismatch {
        /// Position in the `Txs` sequence
        position: TxIndex,
        /// Index found in the record
        declared: TxIndex,
    },
}
