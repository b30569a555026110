use crate::store::StoreError;

/// Failure of a roster, attendance or backup operation.
///
/// Validation and duplicate-key failures are raised before the store is
/// touched, so they never leave a partial mutation behind.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("student with roll_no {0} already exists")]
    DuplicateKey(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}
