use axum::extract::{Query, State};
use axum::Json;

use super::with_store;
use crate::api::error::ApiResult;
use crate::api::types::{SharedState, SubjectQuery};
use crate::metrics::{self, MetricsSummary, RankedStudent, StudentMetrics};

/// `GET /api/metrics`
pub async fn summary(
    State(state): State<SharedState>,
    Query(q): Query<SubjectQuery>,
) -> ApiResult<Json<MetricsSummary>> {
    let summary = with_store(&state, move |store| {
        Ok(metrics::summary(&store.load(), q.subject.as_deref()))
    })
    .await?;
    Ok(Json(summary))
}

/// `GET /api/metrics/students`
pub async fn students(
    State(state): State<SharedState>,
    Query(q): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<StudentMetrics>>> {
    let rows = with_store(&state, move |store| {
        Ok(metrics::student_metrics(&store.load(), q.subject.as_deref()))
    })
    .await?;
    Ok(Json(rows))
}

/// `GET /api/rankings`
pub async fn rankings(
    State(state): State<SharedState>,
    Query(q): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<RankedStudent>>> {
    let ranked = with_store(&state, move |store| {
        Ok(metrics::rankings(&store.load(), q.subject.as_deref()))
    })
    .await?;
    Ok(Json(ranked))
}
