use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{admin, attendance, health, metrics, students};
use super::types::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/students", get(students::list).post(students::create))
        .route("/api/students/{roll_no}", delete(students::remove))
        .route("/api/attendance", get(attendance::all))
        .route(
            "/api/attendance/{date}",
            get(attendance::get_day).post(attendance::set_day),
        )
        .route(
            "/api/attendance/{subject}/{date}",
            get(attendance::get_subject_day).post(attendance::set_subject_day),
        )
        .route("/api/metrics", get(metrics::summary))
        .route("/api/metrics/students", get(metrics::students))
        .route("/api/rankings", get(metrics::rankings))
        .route("/admin/print/{date}", get(admin::print_day))
        .route("/admin/print/{subject}/{date}", get(admin::print_subject_day))
        .route("/admin/backup", get(admin::export))
        .route("/admin/restore", post(admin::restore))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
