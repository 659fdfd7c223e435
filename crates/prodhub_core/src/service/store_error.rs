//! Error type shared by the list stores.

use crate::model::task::{TaskId, TaskValidationError};
use crate::repo::kv_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure surfaced to user-initiated operations.
#[derive(Debug)]
pub enum StoreError {
    /// Durable write or read failed; in-memory state was left unchanged.
    Repo(RepoError),
    /// Caller input was rejected before any mutation.
    Validation(TaskValidationError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// The stored list already holds the largest representable task id.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::IdsExhausted => write!(f, "no task id left to issue"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::TaskNotFound(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}
