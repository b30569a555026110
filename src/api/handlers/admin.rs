use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::with_store;
use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{Message, SharedState};
use crate::attendance;
use crate::backup;
use crate::error::ServiceError;
use crate::model::DEFAULT_SUBJECT;
use crate::sheet;

async fn print(state: SharedState, subject: Option<String>, date: String) -> Response {
    let sheet_subject = subject.clone().unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    let entries = with_store(&state, move |store| {
        attendance::get_attendance(store, subject.as_deref(), &date).map(|e| (date, e))
    })
    .await;
    match entries {
        Ok((date, entries)) => {
            let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
            Html(sheet::render_sheet(
                sheet_subject.trim(),
                &date,
                &entries,
                &generated_at,
            ))
            .into_response()
        }
        Err(e) => e.into_text_response(),
    }
}

/// `GET /admin/print/{date}`
pub async fn print_day(State(state): State<SharedState>, Path(date): Path<String>) -> Response {
    print(state, None, date).await
}

/// `GET /admin/print/{subject}/{date}`
pub async fn print_subject_day(
    State(state): State<SharedState>,
    Path((subject, date)): Path<(String, String)>,
) -> Response {
    print(state, Some(subject), date).await
}

/// `GET /admin/backup`
pub async fn export(State(state): State<SharedState>) -> ApiResult<Response> {
    let doc = with_store(&state, |store| Ok(store.load())).await?;
    let bytes = backup::export_bundle(&doc).map_err(|e| ApiError::Internal(format!("{e:#}")))?;
    let filename = format!(
        "attendance-backup-{}.zip",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// `POST /admin/restore` with a bundle from `/admin/backup` (or a bare JSON
/// document) as the body. Replaces the whole document.
pub async fn restore(State(state): State<SharedState>, body: Bytes) -> ApiResult<Json<Message>> {
    let summary = backup::import_bundle(&body).map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;
    let format = summary.bundle_format_detected;
    let doc = summary.document;
    let students = doc.students.len();
    with_store(&state, move |store| {
        store.save(&doc).map_err(ServiceError::from)
    })
    .await?;
    info!(%format, students, "attendance document restored");
    Ok(Json(Message {
        students: Some(students),
        ..Message::new("Attendance document restored")
    }))
}
