pub mod account;
pub mod activity;
pub mod armor;
pub mod character;
pub mod equipment;
pub mod keyed_lock;
pub mod stat_cache;
pub mod weapon;

use crate::domain::{RepoCreateError, RepoError};

/// Why a manager could not hand out a stored row for a natural key.
#[derive(Debug, Clone, PartialEq)]
pub enum EnsureError {
    /// The builder produced no record: upstream missing, malformed, or an
    /// unknown definition.
    NotResolved,
    StorageError(String),
}

impl std::fmt::Display for EnsureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnsureError::NotResolved => write!(f, "Entity could not be resolved"),
            EnsureError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl From<RepoError> for EnsureError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::StorageError(e) => EnsureError::StorageError(e),
        }
    }
}

/// Reference rows may be inserted more than once; the store keeps the first.
pub(crate) fn tolerate_conflict(result: Result<(), RepoCreateError>) -> Result<(), EnsureError> {
    match result {
        Ok(()) | Err(RepoCreateError::Conflict) => Ok(()),
        Err(RepoCreateError::StorageError(e)) => Err(EnsureError::StorageError(e)),
    }
}
