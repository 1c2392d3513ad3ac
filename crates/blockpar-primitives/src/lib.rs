//! # blockpar-primitives
//!
//! Primitive types shared by the block parallelism analyzer.
//!
//! Accounts are identified by a 20-byte [`Address`], storage slots and
//! transaction/block hashes by a 32-byte [`H256`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::Address;
pub use error::ParseError;
pub use hash::H256;

/// Block number type
pub type BlockNumber = u64;

/// Gas type, used as the flat execution cost of a transaction
pub type Gas = u64;

/// Position of a transaction inside its block
pub type TxIndex = usize;
