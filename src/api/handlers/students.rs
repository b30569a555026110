use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::with_store;
use crate::api::error::ApiResult;
use crate::api::types::{Message, NewStudent, SharedState};
use crate::model::Student;
use crate::roster;

/// `GET /api/students`
pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Student>>> {
    let students = with_store(&state, |store| Ok(roster::list_students(store))).await?;
    Ok(Json(students))
}

/// `POST /api/students`
pub async fn create(
    State(state): State<SharedState>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let Json(body) = body?;
    let student = with_store(&state, move |store| {
        roster::add_student(
            store,
            body.roll_no.as_deref().unwrap_or_default(),
            body.name.as_deref().unwrap_or_default(),
            body.course.as_deref(),
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// `DELETE /api/students/{roll_no}`
pub async fn remove(
    State(state): State<SharedState>,
    Path(roll_no): Path<String>,
) -> ApiResult<Json<Message>> {
    let msg = format!("Student {roll_no} removed");
    with_store(&state, move |store| roster::remove_student(store, &roll_no)).await?;
    Ok(Json(Message::new(msg)))
}
