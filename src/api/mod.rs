mod error;
mod handlers;
mod router;
mod types;

pub use error::{ApiError, ApiResult};
pub use router::router;
pub use types::{AppState, SharedState};
