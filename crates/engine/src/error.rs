//! Errors surfaced by the ledger engine.
//!
//! Every write operation reports exactly one of these per call; a failed
//! operation never leaves a partial effect behind (the enclosing database
//! transaction is rolled back).

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or out-of-range input, rejected before any mutation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The referenced entity is absent or not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),
    /// The operation would violate a referential rule (e.g. deleting an
    /// account that transactions still reference).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Storage failure; the whole atomic unit was aborted.
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
