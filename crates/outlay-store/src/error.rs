//! Error types for outlay-store

use outlay_core::CoreError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Corrupt data file {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error")]
    CsvError(#[from] csv::Error),

    #[error("Expense not found: {id}")]
    NotFound { id: String },

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether the error was caused by bad caller input rather than the
    /// store itself
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::NotFound { .. } | StoreError::Invalid(_))
    }
}
