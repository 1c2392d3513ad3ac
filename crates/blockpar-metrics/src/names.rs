//! Metric names recorded by the analyzer and the CLI

/// Conflict graph construction, microseconds
pub const BUILD_US: &str = "phase.build_us";
/// Transitive reduction, microseconds
pub const REDUCE_US: &str = "phase.reduce_us";
/// Critical path computation, microseconds
pub const CRITICAL_PATH_US: &str = "phase.critical_path_us";
/// One lane schedule simulation, microseconds
pub const SCHEDULE_US: &str = "phase.schedule_us";
/// Whole analysis of one block, microseconds
pub const BLOCK_US: &str = "block.total_us";

/// Blocks analyzed successfully
pub const BLOCKS_ANALYZED: &str = "blocks.analyzed";
/// Blocks that failed to load or analyze
pub const BLOCKS_FAILED: &str = "blocks.failed";
/// Transactions seen across analyzed blocks
pub const TXS_ANALYZED: &str = "txs.analyzed";
/// Conflict edges before reduction
pub const EDGES_BUILT: &str = "edges.built";
/// Conflict edges kept by reduction
pub const EDGES_KEPT: &str = "edges.kept";

/// Blocks currently being analyzed
pub const BLOCKS_IN_FLIGHT: &str = "blocks.in_flight";
