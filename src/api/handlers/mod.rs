pub mod admin;
pub mod attendance;
pub mod health;
pub mod metrics;
pub mod students;

use super::error::ApiError;
use super::types::SharedState;
use crate::error::ServiceError;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Runs store work on the blocking pool; file I/O happens inside `op`.
pub(crate) async fn with_store<T, F>(state: &SharedState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&DocumentStore) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.store))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}
