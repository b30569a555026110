//! Student roster and attendance service.
//!
//! One JSON document on disk holds the roster and every attendance mark.
//! [`store::DocumentStore`] caches it in memory and rewrites it wholesale on
//! each change; [`roster`] and [`attendance`] mutate it, [`metrics`] derives
//! percentages and rankings from it on every read, and [`api`] exposes all of
//! that over HTTP.

pub mod api;
pub mod attendance;
pub mod backup;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod roster;
pub mod sheet;
pub mod store;

pub use error::ServiceError;
pub use store::DocumentStore;
