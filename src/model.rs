use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Subject used by the flat, per-date attendance routes.
pub const DEFAULT_SUBJECT: &str = "general";
pub const DEFAULT_COURSE: &str = "N/A";

fn default_course() -> String {
    DEFAULT_COURSE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub roll_no: String,
    pub name: String,
    #[serde(default = "default_course")]
    pub course: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub roll_no: String,
    pub status: AttendanceStatus,
    /// Student name as it was when the entry was written.
    #[serde(default)]
    pub name: String,
}

/// date (`YYYY-MM-DD`) -> entries
pub type DayBuckets = BTreeMap<String, Vec<AttendanceEntry>>;
/// subject -> date -> entries
pub type AttendanceMap = BTreeMap<String, DayBuckets>;

/// The single persisted document: roster plus attendance history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct AttendanceDocument {
    pub students: Vec<Student>,
    pub attendance: AttendanceMap,
}

impl AttendanceDocument {
    pub fn find_student(&self, roll_no: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.roll_no == roll_no)
    }

    pub fn roster_keys(&self) -> HashSet<&str> {
        self.students.iter().map(|s| s.roll_no.as_str()).collect()
    }

    pub fn bucket(&self, subject: &str, date: &str) -> Option<&[AttendanceEntry]> {
        self.attendance
            .get(subject)
            .and_then(|days| days.get(date))
            .map(|entries| entries.as_slice())
    }

    pub fn bucket_count(&self) -> usize {
        self.attendance.values().map(|days| days.len()).sum()
    }
}

// On-disk shape accepted when reading. `students`/`attendance` may be missing
// or null, and attendance may still be in the older flat `date -> entries`
// layout, which is folded into DEFAULT_SUBJECT.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    students: Option<Vec<Student>>,
    #[serde(default)]
    attendance: Option<BTreeMap<String, RawBucket>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBucket {
    Day(Vec<AttendanceEntry>),
    Subject(DayBuckets),
}

impl From<RawDocument> for AttendanceDocument {
    fn from(raw: RawDocument) -> Self {
        let mut attendance = AttendanceMap::new();
        for (key, bucket) in raw.attendance.unwrap_or_default() {
            match bucket {
                RawBucket::Day(entries) => {
                    let days = attendance.entry(DEFAULT_SUBJECT.to_string()).or_default();
                    if days.insert(key.clone(), entries).is_some() {
                        warn!(
                            subject = DEFAULT_SUBJECT,
                            date = %key,
                            "duplicate attendance bucket, keeping the flat one"
                        );
                    }
                }
                RawBucket::Subject(days) => {
                    let merged = attendance.entry(key.clone()).or_default();
                    for (date, entries) in days {
                        if merged.insert(date.clone(), entries).is_some() {
                            warn!(
                                subject = %key,
                                date = %date,
                                "duplicate attendance bucket, keeping the nested one"
                            );
                        }
                    }
                }
            }
        }
        AttendanceDocument {
            students: raw.students.unwrap_or_default(),
            attendance,
        }
    }
}
