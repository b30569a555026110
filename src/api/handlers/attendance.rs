use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use super::with_store;
use crate::api::error::ApiResult;
use crate::api::types::{Message, SharedState};
use crate::attendance::{self, MarkInput};
use crate::model::{AttendanceEntry, AttendanceMap};

/// `GET /api/attendance`
pub async fn all(State(state): State<SharedState>) -> ApiResult<Json<AttendanceMap>> {
    let map = with_store(&state, |store| Ok(attendance::all_attendance(store))).await?;
    Ok(Json(map))
}

async fn read(
    state: SharedState,
    subject: Option<String>,
    date: String,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    let entries = with_store(&state, move |store| {
        attendance::get_attendance(store, subject.as_deref(), &date)
    })
    .await?;
    Ok(Json(entries))
}

async fn write(
    state: SharedState,
    subject: Option<String>,
    date: String,
    body: Result<Json<Vec<MarkInput>>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(marks) = body?;
    let stored = with_store(&state, move |store| {
        attendance::set_attendance(store, subject.as_deref(), &date, &marks)
    })
    .await?;
    Ok(Json(Message {
        saved: Some(stored.len()),
        ..Message::new("Attendance saved")
    }))
}

/// `GET /api/attendance/{date}`
pub async fn get_day(
    State(state): State<SharedState>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    read(state, None, date).await
}

/// `GET /api/attendance/{subject}/{date}`
pub async fn get_subject_day(
    State(state): State<SharedState>,
    Path((subject, date)): Path<(String, String)>,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    read(state, Some(subject), date).await
}

/// `POST /api/attendance/{date}`
pub async fn set_day(
    State(state): State<SharedState>,
    Path(date): Path<String>,
    body: Result<Json<Vec<MarkInput>>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    write(state, None, date, body).await
}

/// `POST /api/attendance/{subject}/{date}`
pub async fn set_subject_day(
    State(state): State<SharedState>,
    Path((subject, date)): Path<(String, String)>,
    body: Result<Json<Vec<MarkInput>>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    write(state, Some(subject), date, body).await
}
