use attendanced::api::{self, AppState};
use attendanced::store::DocumentStore;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn app_at(path: &Path) -> Router {
    api::router(AppState::new(DocumentStore::new(path)))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
    (status, value)
}

#[tokio::test]
async fn added_students_are_listed_once_in_roll_order() {
    let dir = temp_dir("attendanced-students-list");
    let app = app_at(&dir.join("attendance.json"));

    let (status, created) = call(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "roll_no": "002", "name": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({ "roll_no": "002", "name": "Bob", "course": "N/A" }));

    let (status, _) = call(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "roll_no": "001", "name": "Alice", "course": "Maths" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = call(&app, "GET", "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().expect("array").clone();
    let keys: Vec<&str> = list
        .iter()
        .filter_map(|s| s.get("roll_no").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(keys, vec!["001", "002"]);
    assert_eq!(
        list.iter().filter(|s| s["roll_no"] == json!("001")).count(),
        1
    );
    assert_eq!(list[0]["course"], json!("Maths"));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn duplicate_roll_no_is_rejected_without_touching_roster() {
    let dir = temp_dir("attendanced-students-dup");
    let path = dir.join("attendance.json");
    let app = app_at(&path);

    call(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "roll_no": "001", "name": "Alice" })),
    )
    .await;
    let before = std::fs::read(&path).expect("read document");

    let (status, body) = call(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "roll_no": "001", "name": "Mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("bad_request"));
    assert!(body["message"].as_str().unwrap_or("").contains("001"));

    let (_, list) = call(&app, "GET", "/api/students", None).await;
    assert_eq!(list, json!([{ "roll_no": "001", "name": "Alice", "course": "N/A" }]));
    assert_eq!(std::fs::read(&path).expect("read document"), before);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn missing_fields_and_bad_bodies_are_400() {
    let dir = temp_dir("attendanced-students-bad");
    let app = app_at(&dir.join("attendance.json"));

    for body in [
        json!({ "name": "No Roll" }),
        json!({ "roll_no": "001" }),
        json!({ "roll_no": "", "name": "Empty" }),
        json!({ "roll_no": "001", "name": 7 }),
        json!(["not", "an", "object"]),
    ] {
        let (status, _) = call(&app, "POST", "/api/students", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
    }

    let req = Request::builder()
        .method("POST")
        .uri("/api/students")
        .body(Body::from(r#"{"roll_no":"001","name":"Alice"}"#))
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (_, list) = call(&app, "GET", "/api/students", None).await;
    assert_eq!(list, json!([]));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn deleting_unknown_student_is_404() {
    let dir = temp_dir("attendanced-students-404");
    let app = app_at(&dir.join("attendance.json"));

    let (status, body) = call(&app, "DELETE", "/api/students/S404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn deleting_student_removes_it_from_every_bucket() {
    let dir = temp_dir("attendanced-students-cascade");
    let app = app_at(&dir.join("attendance.json"));

    for (roll, name) in [("S001", "Alice"), ("S002", "Bob")] {
        call(
            &app,
            "POST",
            "/api/students",
            Some(json!({ "roll_no": roll, "name": name })),
        )
        .await;
    }
    let marks = json!([
        { "roll_no": "S001", "status": "present" },
        { "roll_no": "S002", "status": "absent" }
    ]);
    for uri in [
        "/api/attendance/2024-01-01",
        "/api/attendance/2024-01-02",
        "/api/attendance/science/2024-01-02",
    ] {
        let (status, _) = call(&app, "POST", uri, Some(marks.clone())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(&app, "DELETE", "/api/students/S001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap_or("").contains("S001"));

    for uri in [
        "/api/attendance/2024-01-01",
        "/api/attendance/2024-01-02",
        "/api/attendance/science/2024-01-02",
    ] {
        let (status, entries) = call(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            entries,
            json!([{ "roll_no": "S002", "status": "absent", "name": "Bob" }]),
            "{uri}"
        );
    }

    let (_, list) = call(&app, "GET", "/api/students", None).await;
    assert_eq!(list.as_array().map(|a| a.len()), Some(1));

    let _ = std::fs::remove_dir_all(dir);
}
