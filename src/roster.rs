use crate::error::ServiceError;
use crate::model::{Student, DEFAULT_COURSE};
use crate::store::DocumentStore;
use tracing::info;

pub fn list_students(store: &DocumentStore) -> Vec<Student> {
    store.load().students
}

pub fn add_student(
    store: &DocumentStore,
    roll_no: &str,
    name: &str,
    course: Option<&str>,
) -> Result<Student, ServiceError> {
    let roll_no = roll_no.trim();
    let name = name.trim();
    if roll_no.is_empty() || name.is_empty() {
        return Err(ServiceError::validation("roll_no and name are required"));
    }
    let course = course
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COURSE);

    let mut doc = store.load();
    if doc.find_student(roll_no).is_some() {
        return Err(ServiceError::DuplicateKey(roll_no.to_string()));
    }

    let student = Student {
        roll_no: roll_no.to_string(),
        name: name.to_string(),
        course: course.to_string(),
    };
    doc.students.push(student.clone());
    doc.students.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));
    store.save(&doc)?;

    info!(roll_no = %student.roll_no, "student added");
    Ok(student)
}

/// Removes the student and every attendance entry that references it, in one
/// save. Returns the number of attendance entries dropped.
pub fn remove_student(store: &DocumentStore, roll_no: &str) -> Result<usize, ServiceError> {
    let mut doc = store.load();
    let Some(pos) = doc.students.iter().position(|s| s.roll_no == roll_no) else {
        return Err(ServiceError::NotFound(format!(
            "student with roll_no {roll_no} not found"
        )));
    };
    doc.students.remove(pos);

    let mut dropped = 0;
    for days in doc.attendance.values_mut() {
        for entries in days.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.roll_no != roll_no);
            dropped += before - entries.len();
        }
    }
    store.save(&doc)?;

    info!(roll_no, dropped, "student removed");
    Ok(dropped)
}
