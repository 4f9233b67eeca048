//! Read-only views computed from the stored collections on every call.

use crate::model::{AttendanceRecords, AttendanceSheet, AttendanceStatus};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

pub const STATS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

impl StatusCounts {
    pub fn from_records(records: &AttendanceRecords) -> Self {
        let mut out = Self::default();
        for status in records.values() {
            match status {
                AttendanceStatus::Present => out.present += 1,
                AttendanceStatus::Absent => out.absent += 1,
                AttendanceStatus::Late => out.late += 1,
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub date: String,
    /// `MM-DD`, for chart axes.
    pub label: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub status: AttendanceStatus,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub subject: &'static str,
    pub score: i64,
    pub full_mark: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentDay {
    pub name: &'static str,
    pub submitted: u32,
    pub pending: u32,
}

pub fn find_sheet<'a>(
    sheets: &'a [AttendanceSheet],
    date: &str,
    class_id: &str,
) -> Option<&'a AttendanceSheet> {
    sheets
        .iter()
        .find(|s| s.date == date && s.class_id == class_id)
}

/// Counts for the trailing window ending on `today`, oldest first.
pub fn attendance_stats(
    sheets: &[AttendanceSheet],
    class_id: &str,
    today: NaiveDate,
) -> Vec<DayStats> {
    (0..STATS_WINDOW_DAYS)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            let date = day.format("%Y-%m-%d").to_string();
            let counts = find_sheet(sheets, &date, class_id)
                .map(|s| StatusCounts::from_records(&s.records))
                .unwrap_or_default();
            DayStats {
                label: day.format("%m-%d").to_string(),
                date,
                counts,
            }
        })
        .collect()
}

/// Every recorded status for the student across all classes, newest first.
/// Sheets whose date does not parse are skipped.
pub fn student_history(sheets: &[AttendanceSheet], student_id: &str) -> Vec<HistoryEntry> {
    let mut rows: Vec<(NaiveDate, HistoryEntry)> = sheets
        .iter()
        .filter_map(|sheet| {
            let status = *sheet.records.get(student_id)?;
            let day = NaiveDate::parse_from_str(&sheet.date, "%Y-%m-%d").ok()?;
            Some((
                day,
                HistoryEntry {
                    date: sheet.date.clone(),
                    status,
                    class_id: sheet.class_id.clone(),
                },
            ))
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0));
    rows.into_iter().map(|(_, e)| e).collect()
}

const PERFORMANCE_SUBJECTS: [(&str, i64); 6] = [
    ("Math", 10),
    ("Science", 20),
    ("English", -5),
    ("History", 5),
    ("Art", 15),
    ("PE", 25),
];

/// Placeholder radar-chart series. Stable per student id: the seed is the code
/// point of the id's second character.
pub fn student_performance(student_id: &str) -> Vec<SubjectScore> {
    let seed = student_id
        .chars()
        .nth(1)
        .map(|c| c as i64)
        .filter(|c| *c != 0)
        .unwrap_or(50);
    PERFORMANCE_SUBJECTS
        .iter()
        .map(|&(subject, offset)| SubjectScore {
            subject,
            score: (seed + offset).min(100),
            full_mark: 100,
        })
        .collect()
}

/// Placeholder weekly submission series; identical for every class.
pub fn class_assignment_stats(_class_id: &str) -> Vec<AssignmentDay> {
    [
        ("Mon", 24, 4),
        ("Tue", 20, 8),
        ("Wed", 26, 2),
        ("Thu", 22, 6),
        ("Fri", 28, 0),
    ]
    .into_iter()
    .map(|(name, submitted, pending)| AssignmentDay {
        name,
        submitted,
        pending,
    })
    .collect()
}
