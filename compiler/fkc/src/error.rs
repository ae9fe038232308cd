//! Driver errors and exit statuses.

use std::path::PathBuf;

use fk_diagnostic::{ErrorCode, ScopeError};
use fk_index::IndexError;

use crate::ConfigError;

/// Exit status for failures without an error code.
pub const EXIT_FAILURE: i32 = 1;

/// Anything that stops an `fkc` run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid index '{}': {source}", path.display())]
    Index { path: PathBuf, source: IndexError },

    #[error("invalid kernel document '{}': {source}", path.display())]
    Kernels {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("cannot serialize extraction: {0}")]
    Serialize(serde_json::Error),

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DriverError {
    /// Error code of a resolution failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            DriverError::Scope(error) => Some(error.code()),
            _ => None,
        }
    }

    pub fn exit_status(&self) -> i32 {
        match self {
            DriverError::Scope(error) => error.exit_status(),
            _ => EXIT_FAILURE,
        }
    }
}
