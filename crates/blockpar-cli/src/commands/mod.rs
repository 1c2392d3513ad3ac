//! Subcommand implementations

pub mod analyze;
pub mod folder;

use crate::config::Config;
use blockpar_primitives::Address;
use blockpar_scheduler::AnalysisConfig;
use clap::Args;

/// Flags shared by every command that analyzes blocks; each overrides the
/// config file
#[derive(Debug, Clone, Default, Args)]
pub struct AnalysisArgs {
    /// Lane counts to simulate, comma separated
    #[arg(long, value_delimiter = ',')]
    pub lanes: Option<Vec<usize>>,

    /// Treat contracts with written storage as written addresses
    #[arg(long)]
    pub storage_root_conflicts: bool,

    /// Exclude an address from conflict detection (repeatable)
    #[arg(long = "ignore", value_name = "ADDRESS")]
    pub ignore: Vec<Address>,

    /// Include per-lane timelines in the report
    #[arg(long)]
    pub timeline: bool,
}

impl AnalysisArgs {
    /// Apply the flags on top of `config`
    pub fn resolve(&self, config: &Config) -> AnalysisConfig {
        let mut config = config.clone();
        if let Some(lanes) = &self.lanes {
            config.lanes = lanes.clone();
        }
        config.storage_root_conflicts |= self.storage_root_conflicts;
        config.ignored_addresses.extend(self.ignore.iter().copied());
        config.analysis(self.timeline)
    }
}
