use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    StructuralMismatch,
    Parse,
}

/// A single failed fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Can't download the page: {0}")]
    Status(StatusCode),

    #[error("Exchange rate table not found")]
    TableNotFound,

    #[error("{code} rate not found in the table")]
    RowNotFound { code: String },

    #[error("row has {found} cells, expected cell {index}")]
    MissingCell { index: usize, found: usize },

    #[error("invalid rate in column {column}: '{value}'")]
    InvalidRate { column: usize, value: String },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Transport => "transport",
            FailureKind::StructuralMismatch => "structural mismatch",
            FailureKind::Parse => "parse",
        };
        f.write_str(name)
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport(_) | FetchError::Status(_) => FailureKind::Transport,
            FetchError::TableNotFound | FetchError::RowNotFound { .. } => {
                FailureKind::StructuralMismatch
            }
            FetchError::MissingCell { .. } | FetchError::InvalidRate { .. } => FailureKind::Parse,
        }
    }
}
