use crate::model::{AttendanceDocument, AttendanceEntry, AttendanceStatus, Student};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Placeholder reported for best/worst day when nothing has been recorded.
pub const NO_DAY: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentMetrics {
    pub roll_no: String,
    pub name: String,
    pub course: String,
    pub present: u32,
    pub absent: u32,
    pub total: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRate {
    pub date: String,
    /// Every entry recorded for the date, including removed students.
    pub entries: u32,
    pub present: u32,
    /// Entries for students still on the roster.
    pub total: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_students: usize,
    pub total_days: usize,
    pub avg_attendance: String,
    pub best_day: String,
    pub worst_day: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStudent {
    pub rank: usize,
    #[serde(flatten)]
    pub metrics: StudentMetrics,
}

pub fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn format_day(day: &DayRate) -> String {
    format!("{} ({})", day.date, format_percent(day.percent))
}

// Every (date, entries) bucket, across subjects unless one is selected.
fn buckets<'a>(
    doc: &'a AttendanceDocument,
    subject: Option<&'a str>,
) -> impl Iterator<Item = (&'a str, &'a [AttendanceEntry])> + 'a {
    doc.attendance
        .iter()
        .filter(move |(name, _)| subject.map_or(true, |s| s == name.as_str()))
        .flat_map(|(_, days)| {
            days.iter()
                .map(|(date, entries)| (date.as_str(), entries.as_slice()))
        })
}

fn metrics_for(student: &Student, present: u32, absent: u32) -> StudentMetrics {
    let total = present + absent;
    StudentMetrics {
        roll_no: student.roll_no.clone(),
        name: student.name.clone(),
        course: student.course.clone(),
        present,
        absent,
        total,
        percent: percent(present, total),
    }
}

/// Per-student counts in roster order. Entries for students no longer on the
/// roster are ignored.
pub fn student_metrics(doc: &AttendanceDocument, subject: Option<&str>) -> Vec<StudentMetrics> {
    let mut counts: HashMap<&str, (u32, u32)> = doc
        .students
        .iter()
        .map(|s| (s.roll_no.as_str(), (0, 0)))
        .collect();
    for (_, entries) in buckets(doc, subject) {
        for entry in entries {
            if let Some((present, absent)) = counts.get_mut(entry.roll_no.as_str()) {
                match entry.status {
                    AttendanceStatus::Present => *present += 1,
                    AttendanceStatus::Absent => *absent += 1,
                }
            }
        }
    }
    doc.students
        .iter()
        .map(|s| {
            let (present, absent) = counts.get(s.roll_no.as_str()).copied().unwrap_or((0, 0));
            metrics_for(s, present, absent)
        })
        .collect()
}

/// Attendance rate per date, ascending, with all subjects of a date combined.
/// Dates whose entries all reference removed students report 0%.
pub fn day_rates(doc: &AttendanceDocument, subject: Option<&str>) -> Vec<DayRate> {
    let roster = doc.roster_keys();
    let mut days: BTreeMap<&str, (u32, u32, u32)> = BTreeMap::new();
    for (date, entries) in buckets(doc, subject) {
        let (recorded, present, total) = days.entry(date).or_insert((0, 0, 0));
        for entry in entries {
            *recorded += 1;
            if !roster.contains(entry.roll_no.as_str()) {
                continue;
            }
            *total += 1;
            if entry.status == AttendanceStatus::Present {
                *present += 1;
            }
        }
    }
    days.into_iter()
        .map(|(date, (entries, present, total))| DayRate {
            date: date.to_string(),
            entries,
            present,
            total,
            percent: percent(present, total),
        })
        .collect()
}

pub fn summary(doc: &AttendanceDocument, subject: Option<&str>) -> MetricsSummary {
    let days: Vec<DayRate> = day_rates(doc, subject)
        .into_iter()
        .filter(|d| d.entries > 0)
        .collect();

    let present: u32 = days.iter().map(|d| d.present).sum();
    let total: u32 = days.iter().map(|d| d.total).sum();

    // Strict comparisons keep the earliest date on ties.
    let mut best: Option<&DayRate> = None;
    let mut worst: Option<&DayRate> = None;
    for day in &days {
        if best.map_or(true, |b| day.percent > b.percent) {
            best = Some(day);
        }
        if worst.map_or(true, |w| day.percent < w.percent) {
            worst = Some(day);
        }
    }

    MetricsSummary {
        total_students: doc.students.len(),
        total_days: days.len(),
        avg_attendance: format_percent(percent(present, total)),
        best_day: best.map(format_day).unwrap_or_else(|| NO_DAY.to_string()),
        worst_day: worst.map(format_day).unwrap_or_else(|| NO_DAY.to_string()),
    }
}

/// Students by percent descending, then name ascending, with standard
/// competition ranks: equal percentages share a rank and the next distinct
/// percentage is ranked by its position (90, 90, 80 -> 1, 1, 3).
pub fn rankings(doc: &AttendanceDocument, subject: Option<&str>) -> Vec<RankedStudent> {
    let mut rows = student_metrics(doc, subject);
    rows.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.roll_no.cmp(&b.roll_no))
    });

    let mut ranked = Vec::with_capacity(rows.len());
    let mut rank = 0;
    let mut prev: Option<f64> = None;
    for (i, metrics) in rows.into_iter().enumerate() {
        if prev != Some(metrics.percent) {
            rank = i + 1;
            prev = Some(metrics.percent);
        }
        ranked.push(RankedStudent { rank, metrics });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_SUBJECT;

    fn student(roll_no: &str, name: &str) -> Student {
        Student {
            roll_no: roll_no.into(),
            name: name.into(),
            course: "N/A".into(),
        }
    }

    fn mark(roll_no: &str, present: bool) -> AttendanceEntry {
        AttendanceEntry {
            roll_no: roll_no.into(),
            status: if present {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
            name: String::new(),
        }
    }

    fn record(doc: &mut AttendanceDocument, subject: &str, date: &str, entries: Vec<AttendanceEntry>) {
        doc.attendance
            .entry(subject.to_string())
            .or_default()
            .insert(date.to_string(), entries);
    }

    #[test]
    fn empty_document_reports_placeholders() {
        let doc = AttendanceDocument::default();
        let s = summary(&doc, None);
        assert_eq!(s.total_students, 0);
        assert_eq!(s.total_days, 0);
        assert_eq!(s.avg_attendance, "0.0%");
        assert_eq!(s.best_day, NO_DAY);
        assert_eq!(s.worst_day, NO_DAY);
        assert!(rankings(&doc, None).is_empty());
    }

    #[test]
    fn single_day_example() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![student("001", "Alice"), student("002", "Bob")];
        record(
            &mut doc,
            DEFAULT_SUBJECT,
            "2024-01-01",
            vec![mark("001", true), mark("002", false)],
        );

        let s = summary(&doc, None);
        assert_eq!(s.avg_attendance, "50.0%");
        assert_eq!(s.best_day, "2024-01-01 (50.0%)");
        assert_eq!(s.worst_day, "2024-01-01 (50.0%)");
        assert_eq!(s.total_days, 1);
    }

    #[test]
    fn ties_share_rank_and_next_rank_skips() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![
            student("c", "Carol"),
            student("b", "Bob"),
            student("a", "Alice"),
        ];
        for day in 1..=10 {
            let date = format!("2024-01-{day:02}");
            record(
                &mut doc,
                DEFAULT_SUBJECT,
                &date,
                vec![
                    mark("a", day != 1),
                    mark("b", day != 2),
                    mark("c", day > 2),
                ],
            );
        }

        let ranked = rankings(&doc, None);
        let view: Vec<(usize, &str, f64)> = ranked
            .iter()
            .map(|r| (r.rank, r.metrics.name.as_str(), r.metrics.percent))
            .collect();
        assert_eq!(
            view,
            vec![(1, "Alice", 90.0), (1, "Bob", 90.0), (3, "Carol", 80.0)]
        );
    }

    #[test]
    fn removed_students_are_ignored() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![student("001", "Alice")];
        record(
            &mut doc,
            DEFAULT_SUBJECT,
            "2024-01-01",
            vec![mark("001", true), mark("gone", false)],
        );
        record(&mut doc, DEFAULT_SUBJECT, "2024-01-02", vec![mark("gone", true)]);

        let per_student = student_metrics(&doc, None);
        assert_eq!(per_student.len(), 1);
        assert_eq!(per_student[0].total, 1);
        assert_eq!(per_student[0].percent, 100.0);

        let days = day_rates(&doc, None);
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].entries, 1);
        assert_eq!(days[1].total, 0);
        assert_eq!(days[1].percent, 0.0);

        // The orphan-only day still competes for worst day but adds nothing
        // to the average.
        let s = summary(&doc, None);
        assert_eq!(s.total_days, 2);
        assert_eq!(s.avg_attendance, "100.0%");
        assert_eq!(s.best_day, "2024-01-01 (100.0%)");
        assert_eq!(s.worst_day, "2024-01-02 (0.0%)");
    }

    #[test]
    fn empty_buckets_are_not_days() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![student("001", "Alice")];
        record(&mut doc, DEFAULT_SUBJECT, "2024-01-01", vec![mark("001", false)]);
        record(&mut doc, DEFAULT_SUBJECT, "2024-01-02", Vec::new());

        let s = summary(&doc, None);
        assert_eq!(s.total_days, 1);
        assert_eq!(s.best_day, "2024-01-01 (0.0%)");
    }

    #[test]
    fn subjects_are_combined_per_date_or_filtered() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![student("001", "Alice"), student("002", "Bob")];
        record(&mut doc, "math", "2024-01-01", vec![mark("001", true), mark("002", true)]);
        record(&mut doc, "art", "2024-01-01", vec![mark("001", false), mark("002", false)]);
        record(&mut doc, "art", "2024-01-02", vec![mark("001", true), mark("002", false)]);

        let days = day_rates(&doc, None);
        assert_eq!(days[0].total, 4);
        assert_eq!(days[0].percent, 50.0);

        let s = summary(&doc, None);
        assert_eq!(s.best_day, "2024-01-01 (50.0%)");
        assert_eq!(s.worst_day, "2024-01-01 (50.0%)");
        assert_eq!(s.avg_attendance, "50.0%");

        let math = summary(&doc, Some("math"));
        assert_eq!(math.total_days, 1);
        assert_eq!(math.avg_attendance, "100.0%");

        let art = summary(&doc, Some("art"));
        assert_eq!(art.best_day, "2024-01-02 (50.0%)");
        assert_eq!(art.worst_day, "2024-01-01 (0.0%)");
    }

    #[test]
    fn students_without_records_rank_last_by_name() {
        let mut doc = AttendanceDocument::default();
        doc.students = vec![
            student("001", "Zed"),
            student("002", "Amy"),
            student("003", "Kim"),
        ];
        record(&mut doc, DEFAULT_SUBJECT, "2024-01-01", vec![mark("001", true)]);

        let ranked = rankings(&doc, None);
        let view: Vec<(usize, &str)> = ranked
            .iter()
            .map(|r| (r.rank, r.metrics.name.as_str()))
            .collect();
        assert_eq!(view, vec![(1, "Zed"), (2, "Amy"), (2, "Kim")]);
    }
}
