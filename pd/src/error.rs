//! Error types for the digit store

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::InvalidNibble;

/// Errors returned by digit store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error for {path}: {message}")]
    Storage { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid digit nibble {nibble:#x} at position {position}")]
    InvalidDigit { position: u64, nibble: u8 },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Position {position} is out of range (total digits: {total})")]
    Range { position: u64, total: u64 },
}

/// Coarse classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Storage,
    InvalidDigit,
    Validation,
    Range,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_digit(position: u64, err: InvalidNibble) -> Self {
        StoreError::InvalidDigit {
            position,
            nibble: err.0,
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Storage { .. } | StoreError::Io { .. } => ErrorKind::Storage,
            StoreError::InvalidDigit { .. } => ErrorKind::InvalidDigit,
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::Range { .. } => ErrorKind::Range,
        }
    }

    /// Check if this error was caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Range)
    }
}

/// Result alias for digit store operations
pub type Result<T> = std::result::Result<T, StoreError>;
