use crate::domain_model::CursorError;

/// Transport-independent error classes the boundary maps onto its own status codes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    FailedPrecondition,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RelationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelationError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RelationError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RelationError::NotFound(_) => ErrorKind::NotFound,
            RelationError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            RelationError::Store(_) | RelationError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<CursorError> for RelationError {
    fn from(error: CursorError) -> Self {
        RelationError::InvalidArgument(error.to_string())
    }
}
