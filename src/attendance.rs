use crate::error::ServiceError;
use crate::model::{AttendanceEntry, AttendanceMap, AttendanceStatus, DEFAULT_SUBJECT};
use crate::store::DocumentStore;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

/// One submitted mark, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkInput {
    #[serde(default)]
    pub roll_no: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl MarkInput {
    pub fn new(roll_no: &str, status: &str) -> Self {
        Self {
            roll_no: Some(roll_no.to_string()),
            status: Some(status.to_string()),
        }
    }
}

/// Accepts exactly `YYYY-MM-DD` naming a real calendar date.
pub fn validate_date(date: &str) -> Result<(), ServiceError> {
    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(ServiceError::validation(format!(
            "invalid date {date:?}, expected YYYY-MM-DD"
        )));
    }
    Ok(())
}

fn resolve_subject(subject: Option<&str>) -> Result<String, ServiceError> {
    match subject {
        None => Ok(DEFAULT_SUBJECT.to_string()),
        Some(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(ServiceError::validation("subject must not be empty"));
            }
            Ok(s.to_string())
        }
    }
}

fn validate_marks(marks: &[MarkInput]) -> Result<Vec<(String, AttendanceStatus)>, ServiceError> {
    marks
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let roll_no = m
                .roll_no
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ServiceError::validation(format!("entry {i}: missing roll_no")))?;
            let status = m
                .status
                .as_deref()
                .and_then(AttendanceStatus::parse)
                .ok_or_else(|| {
                    ServiceError::validation(format!(
                        "entry {i}: status must be \"present\" or \"absent\""
                    ))
                })?;
            Ok((roll_no.to_string(), status))
        })
        .collect()
}

/// Replaces the (subject, date) bucket with the submitted marks.
///
/// All input is validated before the store is read. Marks for roll numbers
/// not on the roster are dropped; when a roll number appears more than once
/// the last mark wins. Returns what was stored.
pub fn set_attendance(
    store: &DocumentStore,
    subject: Option<&str>,
    date: &str,
    marks: &[MarkInput],
) -> Result<Vec<AttendanceEntry>, ServiceError> {
    validate_date(date)?;
    let subject = resolve_subject(subject)?;
    let marks = validate_marks(marks)?;

    let mut doc = store.load();
    let mut entries: Vec<AttendanceEntry> = Vec::with_capacity(marks.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;
    for (roll_no, status) in marks {
        let Some(student) = doc.find_student(&roll_no) else {
            dropped += 1;
            continue;
        };
        let entry = AttendanceEntry {
            roll_no: student.roll_no.clone(),
            status,
            name: student.name.clone(),
        };
        match seen.get(&roll_no).copied() {
            Some(idx) => entries[idx] = entry,
            None => {
                seen.insert(roll_no, entries.len());
                entries.push(entry);
            }
        }
    }

    doc.attendance
        .entry(subject.clone())
        .or_default()
        .insert(date.to_string(), entries.clone());
    store.save(&doc)?;

    info!(%subject, date, stored = entries.len(), dropped, "attendance saved");
    Ok(entries)
}

pub fn get_attendance(
    store: &DocumentStore,
    subject: Option<&str>,
    date: &str,
) -> Result<Vec<AttendanceEntry>, ServiceError> {
    validate_date(date)?;
    let subject = resolve_subject(subject)?;
    Ok(store
        .load()
        .bucket(&subject, date)
        .map(|entries| entries.to_vec())
        .unwrap_or_default())
}

pub fn all_attendance(store: &DocumentStore) -> AttendanceMap {
    store.load().attendance
}
