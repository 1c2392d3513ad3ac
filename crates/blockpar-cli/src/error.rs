//! CLI error types

use blockpar_scheduler::SchedulerError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// Analysis rejected the block
    #[error("Analysis error: {0}")]
    Analysis(#[from] SchedulerError),

    /// Failure tied to one block file
    #[error("{}: {source}", path.display())]
    File {
        /// Offending file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: Box<CliError>,
    },

    /// Worker task died
    #[error("Worker error: {0}")]
    Worker(String),

    /// Some files of a folder run failed
    #[error("{failed} of {total} block files failed")]
    FolderFailed {
        /// Files that failed
        failed: usize,
        /// Files attempted
        total: usize,
    },
}

impl CliError {
    /// Attach the file being processed
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        CliError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context() {
        let err = CliError::InvalidInput("bad".into()).in_file("blocks/1.json");
        let msg = err.to_string();
        assert!(msg.starts_with("blocks/1.json: "));
        assert!(msg.contains("bad"));
    }
}
