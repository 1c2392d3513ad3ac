//! Ordered conflict tests between an earlier and a later transaction

use crate::footprint::Footprint;
use serde::Serialize;

/// Which test linked two transactions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Later reads an address the earlier writes
    ReadAfterWrite,
    /// Earlier reads an address the later writes
    WriteAfterRead,
    /// Later reads a storage slot the earlier writes
    StorageReadAfterWrite,
    /// Earlier reads a storage slot the later writes
    StorageWriteAfterRead,
}

/// A pure test over two footprints: `(earlier, later)`
pub type ConflictRule = fn(&Footprint, &Footprint) -> bool;

fn read_after_write(earlier: &Footprint, later: &Footprint) -> bool {
    later.reads_address_written_by(earlier)
}

fn write_after_read(earlier: &Footprint, later: &Footprint) -> bool {
    earlier.reads_address_written_by(later)
}

fn storage_read_after_write(earlier: &Footprint, later: &Footprint) -> bool {
    later.reads_slot_written_by(earlier)
}

fn storage_write_after_read(earlier: &Footprint, later: &Footprint) -> bool {
    earlier.reads_slot_written_by(later)
}

/// Tests in evaluation order; the first match decides
pub const CONFLICT_RULES: [(ConflictKind, ConflictRule); 4] = [
    (ConflictKind::ReadAfterWrite, read_after_write),
    (ConflictKind::WriteAfterRead, write_after_read),
    (ConflictKind::StorageReadAfterWrite, storage_read_after_write),
    (ConflictKind::StorageWriteAfterRead, storage_write_after_read),
];

/// Find the first rule linking `earlier` and `later`, if any
pub fn detect(earlier: &Footprint, later: &Footprint) -> Option<ConflictKind> {
    CONFLICT_RULES
        .iter()
        .find(|(_, rule)| rule(earlier, later))
        .map(|(kind, _)| *kind)
}

/// Number of edges created by each rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConflictCounts {
    /// Edges from [`ConflictKind::ReadAfterWrite`]
    pub read_after_write: usize,
    /// Edges from [`ConflictKind::WriteAfterRead`]
    pub write_after_read: usize,
    /// Edges from [`ConflictKind::StorageReadAfterWrite`]
    pub storage_read_after_write: usize,
    /// Edges from [`ConflictKind::StorageWriteAfterRead`]
    pub storage_write_after_read: usize,
}

impl ConflictCounts {
    /// Count one edge of the given kind
    pub fn record(&mut self, kind: ConflictKind) {
        match kind {
            ConflictKind::ReadAfterWrite => self.read_after_write += 1,
            ConflictKind::WriteAfterRead => self.write_after_read += 1,
            ConflictKind::StorageReadAfterWrite => self.storage_read_after_write += 1,
            ConflictKind::StorageWriteAfterRead => self.storage_write_after_read += 1,
        }
    }

    /// Total edges counted
    pub fn total(&self) -> usize {
        self.read_after_write
            + self.write_after_read
            + self.storage_read_after_write
            + self.storage_write_after_read
    }
}
