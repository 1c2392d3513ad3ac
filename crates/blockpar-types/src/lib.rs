//! # blockpar-types
//!
//! Decoded block traces consumed by the analyzer.
//!
//! This crate provides:
//! - [`BlockTrace`](block::BlockTrace) - a block with its ordered transactions
//! - [`TxTrace`](transaction::TxTrace) - one transaction, its cost and footprint
//! - [`AccessSet`](access::AccessSet) - declared account and storage accesses

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod block;
pub mod error;
pub mod transaction;

pub use access::{AccessSet, SlotMap};
pub use block::BlockTrace;
pub use error::TypesError;
pub use transaction::TxTrace;
