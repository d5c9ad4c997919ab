//! Engine error types

use thiserror::Error;

use crate::db::DbError;

/// Failures surfaced by summary and streak computation.
///
/// Every failure is local to one invocation; nothing is retried here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store read failed: {0}")]
    StoreRead(#[source] DbError),

    #[error("Store write failed: {0}")]
    StoreWrite(#[source] DbError),
}

/// Failures outside a specific query (opening or committing the surrounding
/// transaction) count as write failures.
impl From<DbError> for EngineError {
    fn from(e: DbError) -> Self {
        EngineError::StoreWrite(e)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
