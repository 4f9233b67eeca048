//! First-open demo data. Each slot is written only when it does not exist yet,
//! so re-running never clobbers user edits.

use crate::credentials::Credential;
use crate::model::{
    AttendanceRecords, AttendanceSheet, AttendanceStatus, Class, Parent, SchoolInfo, Student,
    Teacher,
};
use crate::store::{Slot, Store};
use chrono::{Duration, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::info;

pub const DEMO_PASSWORD: &str = "password";
pub const DEMO_HISTORY_DAYS: i64 = 7;
const DEMO_HISTORY_CLASS: &str = "c1";

#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub seeded: Vec<&'static str>,
}

pub fn initialize(store: &Store, today: NaiveDate) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for slot in Slot::ALL {
        if store.contains(slot)? {
            continue;
        }
        match slot {
            Slot::SchoolInfo => store.set(slot, &demo_school_info())?,
            Slot::Classes => store.set(slot, &demo_classes())?,
            Slot::Students => store.set(slot, &demo_students())?,
            Slot::Teachers => store.set(slot, &demo_teachers())?,
            Slot::Parents => store.set(slot, &demo_parents())?,
            Slot::Attendance => store.set(slot, &demo_attendance(today))?,
            // Diary starts empty and is created by the first send.
            Slot::Diary => continue,
        }
        summary.seeded.push(slot.key());
    }

    if !summary.seeded.is_empty() {
        info!(slots = ?summary.seeded, "seeded demo data");
    }
    Ok(summary)
}

fn demo_school_info() -> SchoolInfo {
    SchoolInfo {
        name: "Demo School".into(),
        address: "123 Education Lane".into(),
    }
}

fn demo_classes() -> Vec<Class> {
    [("c1", "Class 5A"), ("c2", "Class 5B")]
        .into_iter()
        .map(|(id, name)| Class {
            id: id.into(),
            name: name.into(),
        })
        .collect()
}

fn demo_students() -> Vec<Student> {
    [
        ("s1", "Alice Johnson", "c1", "Mrs. Johnson"),
        ("s2", "Bob Smith", "c1", "Mr. Smith"),
        ("s3", "Charlie Brown", "c1", "Mr. Brown"),
        ("s4", "Daisy Miller", "c2", "Ms. Miller"),
        ("s5", "Ethan Hunt", "c2", "Mr. Hunt"),
    ]
    .into_iter()
    .map(|(id, name, class_id, parent_name)| Student {
        id: id.into(),
        name: name.into(),
        class_id: class_id.into(),
        parent_name: parent_name.into(),
    })
    .collect()
}

fn demo_teachers() -> Vec<Teacher> {
    vec![Teacher {
        id: "t1".into(),
        name: "Mr. Anderson".into(),
        subject: "Mathematics".into(),
        email: "teacher@school.com".into(),
        credential: Credential::new(DEMO_PASSWORD),
        class_id: Some("c1".into()),
    }]
}

fn demo_parents() -> Vec<Parent> {
    vec![Parent {
        id: "p1".into(),
        name: "Mrs. Johnson".into(),
        email: "parent@school.com".into(),
        credential: Credential::new(DEMO_PASSWORD),
        student_ids: vec!["s1".into()],
    }]
}

fn demo_attendance(today: NaiveDate) -> Vec<AttendanceSheet> {
    let students: Vec<Student> = demo_students()
        .into_iter()
        .filter(|s| s.class_id == DEMO_HISTORY_CLASS)
        .collect();
    (0..DEMO_HISTORY_DAYS)
        .map(|back| {
            let date = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
            let records: AttendanceRecords = students
                .iter()
                .map(|s| (s.id.clone(), demo_status(&date, &s.id)))
                .collect();
            AttendanceSheet {
                date,
                class_id: DEMO_HISTORY_CLASS.into(),
                records,
            }
        })
        .collect()
}

/// Roughly 80% present, 10% absent, 10% late, stable for a given day and
/// student.
fn demo_status(date: &str, student_id: &str) -> AttendanceStatus {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(b"/");
    hasher.update(student_id.as_bytes());
    let bucket = hasher.finalize()[0] % 10;
    match bucket {
        0 => AttendanceStatus::Late,
        1 => AttendanceStatus::Absent,
        _ => AttendanceStatus::Present,
    }
}
